//! Snapshot versioning over project working trees.
//!
//! A commit is a frozen [`Node`](crate::tree::Node) behind an `Arc`. The
//! working tree of a branch shares structure with its latest commit until
//! the first write un-shares the touched path, so snapshots cost nothing
//! up front and never see later edits.

mod merge;
mod project;

pub use merge::merge_structures;
pub use project::{Branch, Commit, Project, DEFAULT_BRANCH};
