/**
 * Blob store collaborator.
 *  Binary payloads live outside the document; the core
 *  only ever persists the opaque id handed back by the store.
 */
pub mod blobs;
/**
 * The persisted document: users, shared folders,
 *  projects and the handle index, plus the upgrade
 *  pass that fills in defaults for older documents.
 */
pub mod document;
/**
 * Error kinds shared across the crate.
 */
pub mod error;
/**
 * Compact identifiers: per-node short ids and
 *  capability keys for shared folders.
 */
pub mod ids;
/**
 * Path resolution against a tree root, and the
 *  tagged location lookup that tells plain folders
 *  apart from project roots.
 */
pub mod navigator;
/**
 * Atomic whole-document persistence and the
 *  transaction scope that serializes mutation.
 */
pub mod store;
/**
 * Folder / file nodes and their local mutation
 *  primitives, plus deterministic listings.
 */
pub mod tree;
/**
 * Snapshot versioning: branches, commits,
 *  rollback and merge over tree snapshots.
 */
pub mod versioning;
/**
 * Intent level entry points. Each intent runs as
 *  one transaction against the store.
 */
pub mod workspace;

mod access;

pub mod prelude {
    pub use crate::blobs::{BlobId, BlobStore};
    pub use crate::document::{Document, SharedFolder, User, UserId};
    pub use crate::error::ErrorKind;
    pub use crate::ids::{CapabilityKey, ShortId};
    pub use crate::navigator::{locate, resolve, Location};
    pub use crate::store::{FileStateProvider, MemoryStateProvider, StateProvider, Store};
    pub use crate::tree::{FileContent, FileEntry, FileKind, Listing, Node, NodeTag};
    pub use crate::versioning::{Branch, Commit, Project};
    pub use crate::workspace::{Actor, Intent, ProjectRef, Reply, Workspace, WorkspaceError};
}
