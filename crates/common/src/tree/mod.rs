//! Folder / file tree.
//!
//! - **[`Node`]**: a folder holding child folders and files, tagged as plain
//!   or as the root of a project
//! - **[`FileEntry`]**: a leaf record with a type tag, a per-node
//!   [`ShortId`](crate::ids::ShortId), and inline text or a blob reference
//! - **[`Listing`]**: a deterministic, pageable view of a node's children
//!
//! All mutation primitives touch only the node they are called on.

mod file;
mod listing;
mod node;

pub use file::{FileContent, FileEntry, FileKind};
pub use listing::{ListItem, Listing, Page, DEFAULT_PAGE_SIZE};
pub use node::{validate_name, Child, Node, NodeTag, TreeError};
