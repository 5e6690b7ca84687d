use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::blobs::BlobId;
use crate::ids::{CapabilityKey, ShortId};
use crate::tree::{Node, NodeTag};
use crate::versioning::Project;

/// Internal user identifier, as handed in by the transport.
pub type UserId = String;

/// Per-user state: a root tree, a cursor into it, and bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    /// Folder names from the root of `structure` to the current folder.
    ///  May run past a project root into the project's working tree.
    #[serde(default)]
    pub current_path: Vec<String>,
    #[serde(default)]
    pub structure: Node,
    /// Short id to blob id for every blob file this user wrote.
    #[serde(default)]
    pub file_mappings: IndexMap<ShortId, BlobId>,
    /// Last handle seen for this user.
    #[serde(default)]
    pub username: Option<String>,
}

/// A live grant on `(user_id, path)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedFolder {
    pub user_id: UserId,
    #[serde(default)]
    pub path: Vec<String>,
}

/// The whole persisted state.
///
/// Owned by a single transaction at a time; see [`Store`](crate::store::Store).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    users: IndexMap<UserId, User>,
    #[serde(default)]
    shared_folders: IndexMap<CapabilityKey, SharedFolder>,
    #[serde(default)]
    projects: IndexMap<UserId, IndexMap<String, Project>>,
    /// Case-folded handle to user id.
    #[serde(default)]
    usernames: IndexMap<String, UserId>,
}

/// Normal form of a handle: leading `@` dropped, lower-cased.
pub fn fold_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a stored document and bring it up to the current shape.
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let mut document: Document = serde_json::from_slice(bytes)?;
        document.upgrade();
        Ok(document)
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /* Users */

    /// Record contact from `id`, creating the user on first sight and
    ///  refreshing the handle index when a handle is known.
    pub fn observe(&mut self, id: &str, handle: Option<&str>) -> &mut User {
        let handle = handle.map(fold_handle).filter(|h| !h.is_empty());
        if let Some(handle) = &handle {
            self.usernames.insert(handle.clone(), id.to_string());
        }
        let user = self.users.entry(id.to_string()).or_default();
        if handle.is_some() {
            user.username = handle;
        }
        user
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.get_mut(id)
    }

    pub fn users(&self) -> impl Iterator<Item = (&UserId, &User)> {
        self.users.iter()
    }

    /// Resolve a handle through the index. Only handles that have been
    ///  observed at least once resolve.
    pub fn lookup_handle(&self, handle: &str) -> Option<&UserId> {
        self.usernames.get(&fold_handle(handle))
    }

    /* Projects */

    pub fn project(&self, owner: &str, name: &str) -> Option<&Project> {
        self.projects.get(owner)?.get(name)
    }

    pub fn project_mut(&mut self, owner: &str, name: &str) -> Option<&mut Project> {
        self.projects.get_mut(owner)?.get_mut(name)
    }

    /// Projects owned by `owner`, in creation order.
    pub fn projects_of(&self, owner: &str) -> impl Iterator<Item = (&str, &Project)> {
        self.projects
            .get(owner)
            .into_iter()
            .flat_map(|projects| projects.iter().map(|(name, p)| (name.as_str(), p)))
    }

    /// Returns false, leaving the existing project alone, if `owner`
    ///  already has a project called `name`.
    pub fn insert_project(&mut self, owner: &str, name: &str) -> bool {
        let projects = self.projects.entry(owner.to_string()).or_default();
        if projects.contains_key(name) {
            return false;
        }
        projects.insert(name.to_string(), Project::new());
        true
    }

    /* Shares */

    pub fn shared_folder(&self, key: &CapabilityKey) -> Option<&SharedFolder> {
        self.shared_folders.get(key)
    }

    pub fn shared_folders(&self) -> impl Iterator<Item = (&CapabilityKey, &SharedFolder)> {
        self.shared_folders.iter()
    }

    /// Bind a fresh key, unique among live shares, to `(owner, path)`.
    pub fn insert_share(&mut self, owner: &str, path: Vec<String>) -> CapabilityKey {
        let key = CapabilityKey::generate_unique(|candidate| {
            self.shared_folders.contains_key(candidate)
        });
        self.shared_folders.insert(
            key.clone(),
            SharedFolder {
                user_id: owner.to_string(),
                path,
            },
        );
        key
    }

    /* Upgrade */

    /// Tag folders that stand for a project but were written before
    ///  project roots carried an explicit tag. A plain folder is tagged
    ///  when its owner has a project with the folder's name.
    pub fn upgrade(&mut self) -> usize {
        let mut tagged = 0;
        for (owner, user) in self.users.iter_mut() {
            let Some(projects) = self.projects.get(owner) else {
                continue;
            };
            if projects.is_empty() {
                continue;
            }
            tagged += tag_project_roots(&mut user.structure, projects);
        }
        if tagged > 0 {
            tracing::info!(tagged, "tagged legacy project folders");
        }
        tagged
    }
}

fn tag_project_roots(node: &mut Node, projects: &IndexMap<String, Project>) -> usize {
    let mut tagged = 0;
    for (name, child) in node.folder_slots_mut().iter_mut() {
        if !child.tag().is_plain() {
            continue;
        }
        if projects.contains_key(name) {
            Arc::make_mut(child).set_tag(NodeTag::ProjectRoot {
                project: name.clone(),
            });
            tagged += 1;
        } else if child.folders().next().is_some() {
            tagged += tag_project_roots(Arc::make_mut(child), projects);
        }
    }
    tagged
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_observe_creates_once() {
        let mut doc = Document::new();
        doc.observe("1", None).current_path.push("x".to_string());
        doc.observe("1", Some("@Alice"));

        let user = doc.user("1").unwrap();
        assert_eq!(user.current_path, vec!["x"]);
        assert_eq!(user.username.as_deref(), Some("alice"));
        assert_eq!(doc.lookup_handle("ALICE").map(String::as_str), Some("1"));
        assert_eq!(doc.lookup_handle("@alice").map(String::as_str), Some("1"));
        assert!(doc.lookup_handle("bob").is_none());
    }

    #[test]
    fn test_insert_project_once() {
        let mut doc = Document::new();
        assert!(doc.insert_project("1", "P.git"));
        doc.project_mut("1", "P.git").unwrap().commit("m1");
        assert!(!doc.insert_project("1", "P.git"));
        assert_eq!(doc.project("1", "P.git").unwrap().current().commits().len(), 1);
        assert_eq!(doc.projects_of("1").count(), 1);
        assert_eq!(doc.projects_of("2").count(), 0);
    }

    #[test]
    fn test_decode_legacy_document() {
        let raw = r#"{
            "users": {
                "42": {
                    "current_path": ["work"],
                    "structure": {
                        "folders": {
                            "work": {
                                "folders": {"P.git": {"folders": {}, "files": []}},
                                "files": []
                            }
                        },
                        "files": [{"type": "photo", "message_id": 7, "short_id": "abcdef01", "name": "file_abcdef01"}]
                    }
                }
            },
            "shared_folders": {},
            "projects": {
                "42": {
                    "P.git": {
                        "branches": {"master": {"structure": {"folders": {}, "files": []}, "commits": []}}
                    }
                }
            }
        }"#;

        let doc = Document::decode(raw.as_bytes()).unwrap();
        let user = doc.user("42").unwrap();
        assert!(user.file_mappings.is_empty());
        assert!(user.username.is_none());

        let root = user.structure.folder("work").unwrap().folder("P.git").unwrap();
        assert_eq!(root.tag().project(), Some("P.git"));

        let project = doc.project("42", "P.git").unwrap();
        assert_eq!(project.current_branch_name(), "master");
        assert_eq!(project.collaborators().count(), 0);
        assert!(doc.lookup_handle("anyone").is_none());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Document::decode(b"{not json").is_err());
    }

    #[test]
    fn test_empty_object_is_empty_document() {
        let doc = Document::decode(b"{}").unwrap();
        assert_eq!(doc, Document::new());
    }

    #[test]
    fn test_share_keys_are_unique() {
        let mut doc = Document::new();
        let a = doc.insert_share("1", vec!["x".to_string()]);
        let b = doc.insert_share("1", vec!["x".to_string()]);
        assert_ne!(a, b);
        assert_eq!(doc.shared_folder(&a).unwrap().path, vec!["x"]);
    }
}
