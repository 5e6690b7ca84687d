use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::ShortId;

use super::file::FileEntry;

/**
 * Nodes
 * =====
 * A node is a folder: an ordered map of child folders and an ordered
 *  list of files. Folder names are unique among folders and file names
 *  unique among files, but a folder and a file may share a name.
 * Children are held behind `Arc` and mutated through `Arc::make_mut`,
 *  so cloning a node is O(1) and a clone never observes later writes
 *  to the original. Commits and branches lean on this to snapshot a
 *  working tree without copying it.
 */

/// Explicit marker telling plain folders apart from project roots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeTag {
    #[default]
    Plain,
    ProjectRoot { project: String },
}

impl NodeTag {
    pub fn is_plain(&self) -> bool {
        matches!(self, NodeTag::Plain)
    }

    pub fn project(&self) -> Option<&str> {
        match self {
            NodeTag::Plain => None,
            NodeTag::ProjectRoot { project } => Some(project),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "NodeTag::is_plain")]
    tag: NodeTag,
    #[serde(default)]
    folders: IndexMap<String, Arc<Node>>,
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("folder '{segment}' not found at depth {depth}")]
    NotFound { segment: String, depth: usize },
    #[error("folder already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid name: '{0}'")]
    InvalidName(String),
}

impl TreeError {
    pub fn kind(&self) -> crate::error::ErrorKind {
        use crate::error::ErrorKind;
        match self {
            TreeError::NotFound { .. } => ErrorKind::NotFound,
            TreeError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            TreeError::InvalidName(_) => ErrorKind::InvalidArgument,
        }
    }
}

/// One entry of [`Node::list_children`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child<'a> {
    Folder { name: &'a str, node: &'a Node },
    File(&'a FileEntry),
}

/// Names are path segments, so they may not be empty or contain a separator.
pub fn validate_name(name: &str) -> Result<(), TreeError> {
    if name.trim().is_empty() || name.contains('/') {
        return Err(TreeError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty folder tagged as the root of `project`.
    pub fn project_root(project: impl Into<String>) -> Self {
        Self {
            tag: NodeTag::ProjectRoot {
                project: project.into(),
            },
            ..Self::default()
        }
    }

    pub fn tag(&self) -> &NodeTag {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: NodeTag) {
        self.tag = tag;
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    /* Folders */

    pub fn folder(&self, name: &str) -> Option<&Node> {
        self.folders.get(name).map(Arc::as_ref)
    }

    /// Mutable access to a child folder, un-sharing it first if a snapshot
    ///  still points at it.
    pub fn folder_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.folders.get_mut(name).map(Arc::make_mut)
    }

    pub fn has_folder(&self, name: &str) -> bool {
        self.folders.contains_key(name)
    }

    pub fn folders(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.folders
            .iter()
            .map(|(name, node)| (name.as_str(), node.as_ref()))
    }

    /// Create an empty plain folder.
    pub fn create_folder(&mut self, name: &str) -> Result<&mut Node, TreeError> {
        self.insert_folder(name, Node::new())
    }

    /// Insert a prepared folder under `name`, failing if the name is taken.
    pub fn insert_folder(&mut self, name: &str, node: Node) -> Result<&mut Node, TreeError> {
        validate_name(name)?;
        if self.folders.contains_key(name) {
            return Err(TreeError::AlreadyExists(name.to_string()));
        }
        let slot = self.folders.entry(name.to_string()).or_insert(Arc::new(node));
        Ok(Arc::make_mut(slot))
    }

    /* Files */

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&FileEntry> {
        self.files.iter().find(|file| file.name() == name)
    }

    pub fn file_by_short_id(&self, short_id: &ShortId) -> Option<&FileEntry> {
        self.files.iter().find(|file| file.short_id() == short_id)
    }

    pub fn has_short_id(&self, short_id: &ShortId) -> bool {
        self.file_by_short_id(short_id).is_some()
    }

    /// Draw a short id not used by any file in this node.
    pub fn fresh_short_id(&self) -> ShortId {
        ShortId::generate_unique(|candidate| self.has_short_id(candidate))
    }

    /// Replace the file with the same name in place, or append.
    ///
    /// Returns the replaced entry, if any.
    pub fn add_or_replace_file(&mut self, mut entry: FileEntry) -> Option<FileEntry> {
        let position = self.files.iter().position(|file| file.name() == entry.name());
        // the incoming id must not collide with any *other* file in this node
        let collides = self
            .files
            .iter()
            .enumerate()
            .any(|(idx, file)| Some(idx) != position && file.short_id() == entry.short_id());
        if collides {
            let fresh = ShortId::generate_unique(|candidate| {
                self.files
                    .iter()
                    .enumerate()
                    .any(|(idx, file)| Some(idx) != position && file.short_id() == candidate)
            });
            entry.set_short_id(fresh);
        }

        match position {
            Some(idx) => Some(std::mem::replace(&mut self.files[idx], entry)),
            None => {
                self.files.push(entry);
                None
            }
        }
    }

    /// Folders first, then files, each group in insertion order.
    pub fn list_children(&self) -> Vec<Child<'_>> {
        self.folders
            .iter()
            .map(|(name, node)| Child::Folder {
                name: name.as_str(),
                node: node.as_ref(),
            })
            .chain(self.files.iter().map(Child::File))
            .collect()
    }

    /* Raw access for the merge in `versioning` */

    pub(crate) fn folder_slots_mut(&mut self) -> &mut IndexMap<String, Arc<Node>> {
        &mut self.folders
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn text(name: &str, body: &str, node: &Node) -> FileEntry {
        FileEntry::text(node.fresh_short_id(), name, body)
    }

    #[test]
    fn test_create_folder() {
        let mut root = Node::new();
        root.create_folder("docs").unwrap();
        assert!(root.has_folder("docs"));
        assert!(root.folder("docs").unwrap().is_empty());

        let result = root.create_folder("docs");
        assert_eq!(result.unwrap_err(), TreeError::AlreadyExists("docs".to_string()));
    }

    #[test]
    fn test_rejects_bad_names() {
        let mut root = Node::new();
        assert!(matches!(root.create_folder(""), Err(TreeError::InvalidName(_))));
        assert!(matches!(root.create_folder("a/b"), Err(TreeError::InvalidName(_))));
    }

    #[test]
    fn test_folder_and_file_may_share_a_name() {
        let mut root = Node::new();
        root.create_folder("notes").unwrap();
        let entry = text("notes", "body", &root);
        assert!(root.add_or_replace_file(entry).is_none());
        assert!(root.has_folder("notes"));
        assert!(root.file("notes").is_some());
    }

    #[test]
    fn test_add_or_replace_keeps_position() {
        let mut root = Node::new();
        let a = text("a", "1", &root);
        root.add_or_replace_file(a);
        let b = text("b", "2", &root);
        root.add_or_replace_file(b);

        let replacement = text("a", "3", &root);
        let replaced = root.add_or_replace_file(replacement).unwrap();
        assert_eq!(replaced.inline(), Some("1"));

        let names: Vec<_> = root.files().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(root.file("a").unwrap().inline(), Some("3"));
    }

    #[test]
    fn test_colliding_short_id_is_rerolled() {
        let mut root = Node::new();
        let id: ShortId = "aaaaaaaa".parse().unwrap();
        root.add_or_replace_file(FileEntry::text(id.clone(), "one", "1"));
        root.add_or_replace_file(FileEntry::text(id.clone(), "two", "2"));

        let one = root.file("one").unwrap().short_id().clone();
        let two = root.file("two").unwrap().short_id().clone();
        assert_eq!(one, id);
        assert_ne!(one, two);
    }

    #[test]
    fn test_list_children_order() {
        let mut root = Node::new();
        let f = text("z-file", "x", &root);
        root.add_or_replace_file(f);
        root.create_folder("beta").unwrap();
        root.create_folder("alpha").unwrap();

        let listed: Vec<String> = root
            .list_children()
            .into_iter()
            .map(|child| match child {
                Child::Folder { name, .. } => format!("d:{}", name),
                Child::File(file) => format!("f:{}", file.name()),
            })
            .collect();
        assert_eq!(listed, vec!["d:beta", "d:alpha", "f:z-file"]);
    }

    #[test]
    fn test_clone_is_isolated() {
        let mut root = Node::new();
        root.create_folder("a").unwrap().create_folder("b").unwrap();
        let snapshot = root.clone();

        let deep = root.folder_mut("a").unwrap().folder_mut("b").unwrap();
        let entry = FileEntry::text(deep.fresh_short_id(), "late", "x");
        deep.add_or_replace_file(entry);

        let snap_b = snapshot.folder("a").unwrap().folder("b").unwrap();
        assert!(snap_b.file("late").is_none());
        assert!(root.folder("a").unwrap().folder("b").unwrap().file("late").is_some());
    }

    #[test]
    fn test_serde_shape() {
        let mut root = Node::new();
        root.insert_folder("P.git", Node::project_root("P.git")).unwrap();
        let value = serde_json::to_value(&root).unwrap();
        assert!(value.get("tag").is_none());
        assert_eq!(value["folders"]["P.git"]["tag"]["kind"], "project_root");
        assert_eq!(value["files"], serde_json::json!([]));

        let legacy: Node = serde_json::from_str(r#"{"folders": {"x": {"folders": {}, "files": []}}, "files": []}"#).unwrap();
        assert!(legacy.folder("x").unwrap().tag().is_plain());
    }
}
