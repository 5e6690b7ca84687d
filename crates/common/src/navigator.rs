//! Path resolution.
//!
//! A path is an ordered list of folder names walked from a root node.
//! [`resolve`] and [`resolve_mut`] do not care whose tree they walk: a
//! user's own tree, a branch working tree, or the live subtree behind a
//! capability key all resolve the same way.
//!
//! [`locate`] answers the one question callers used to re-derive by hand:
//! does this path stay in a plain folder, or does it cross into a project?

use crate::tree::{Node, NodeTag, TreeError};

/// Walk `path` from `root`, failing at the first missing segment.
pub fn resolve<'a, S: AsRef<str>>(root: &'a Node, path: &[S]) -> Result<&'a Node, TreeError> {
    let mut node = root;
    for (depth, segment) in path.iter().enumerate() {
        let segment = segment.as_ref();
        node = node.folder(segment).ok_or_else(|| TreeError::NotFound {
            segment: segment.to_string(),
            depth,
        })?;
    }
    Ok(node)
}

/// Mutable twin of [`resolve`]. Every node on the way is un-shared from
///  any snapshot that still references it.
pub fn resolve_mut<'a, S: AsRef<str>>(
    root: &'a mut Node,
    path: &[S],
) -> Result<&'a mut Node, TreeError> {
    let mut node = root;
    for (depth, segment) in path.iter().enumerate() {
        let segment = segment.as_ref();
        node = node.folder_mut(segment).ok_or_else(|| TreeError::NotFound {
            segment: segment.to_string(),
            depth,
        })?;
    }
    Ok(node)
}

/// Where a path in an owner's tree ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// The path stays in plain folders of the owner's tree.
    Folder,
    /// The path reaches a project root. `inner` is the rest of the path,
    ///  to be resolved against the project's current working tree.
    Project {
        project: String,
        /// Path of the project root folder inside the owner's tree.
        root: Vec<String>,
        inner: Vec<String>,
    },
}

impl Location {
    pub fn project(&self) -> Option<&str> {
        match self {
            Location::Folder => None,
            Location::Project { project, .. } => Some(project),
        }
    }
}

/// Resolve `path` against an owner's tree, stopping at the first project
///  root. Segments after the root are not checked here: they live in the
///  project's branches, not in the owner's tree.
pub fn locate<S: AsRef<str>>(root: &Node, path: &[S]) -> Result<Location, TreeError> {
    let mut node = root;
    for (depth, segment) in path.iter().enumerate() {
        let segment = segment.as_ref();
        node = node.folder(segment).ok_or_else(|| TreeError::NotFound {
            segment: segment.to_string(),
            depth,
        })?;
        if let NodeTag::ProjectRoot { project } = node.tag() {
            return Ok(Location::Project {
                project: project.clone(),
                root: to_owned(&path[..=depth]),
                inner: to_owned(&path[depth + 1..]),
            });
        }
    }
    Ok(Location::Folder)
}

fn to_owned<S: AsRef<str>>(segments: &[S]) -> Vec<String> {
    segments.iter().map(|s| s.as_ref().to_string()).collect()
}
