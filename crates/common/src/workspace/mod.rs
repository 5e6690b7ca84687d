//! User-visible operations.
//!
//! [`apply`] is the pure entry point: it takes the document, the acting
//! user and one [`Intent`], mutates the document in place and describes
//! the outcome as a [`Reply`]. It never touches storage or transport.
//!
//! [`Workspace`] wraps `apply` in a [`Store`] transaction per call and owns
//! the blob store, so binary payloads are uploaded before the mutation
//! scope is taken and only their id is recorded inside it.

mod apply;
mod error;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::blobs::{BlobId, BlobStore};
use crate::document::UserId;
use crate::ids::{CapabilityKey, ShortId};
use crate::store::{StateProvider, Store};
use crate::tree::{FileEntry, FileKind, Page, DEFAULT_PAGE_SIZE};

pub use apply::apply;
pub use error::WorkspaceError;

/// Who is asking. The handle, when present, feeds the handle index so
///  the user can later be invited by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub handle: Option<String>,
}

impl Actor {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            handle: None,
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }
}

/// A project by owner and name. No owner means the actor's own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub owner: Option<UserId>,
    pub name: String,
}

impl ProjectRef {
    pub fn own(name: impl Into<String>) -> Self {
        Self {
            owner: None,
            name: name.into(),
        }
    }

    pub fn of(owner: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            name: name.into(),
        }
    }

    pub(crate) fn owner_or<'a>(&'a self, actor: &'a Actor) -> &'a str {
        self.owner.as_deref().unwrap_or(&actor.id)
    }
}

/// Folder an intent reads from or writes to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Destination {
    /// The actor's current folder, inside a project if the cursor is.
    #[default]
    Cwd,
    /// A folder in a project's current working tree.
    Project { project: ProjectRef, path: Vec<String> },
    /// A folder below a shared folder. Read-only.
    Shared { key: CapabilityKey, path: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Mkdir { name: String },
    Cd { name: String },
    Up,
    Ls { at: Destination, page: usize },
    PutText { at: Destination, text: String },
    /// Record a blob that is already in the blob store.
    PutBlob {
        at: Destination,
        kind: FileKind,
        name: Option<String>,
        blob_id: BlobId,
    },
    Open { at: Destination, short_id: ShortId },
    /// Every file directly inside the folder at `at`.
    OpenAll { at: Destination },
    /// Share a folder of the actor's own tree; the current one if no path.
    Share { path: Option<Vec<String>> },
    /// Create a project and its root folder in the current folder.
    InitProject { name: String },
    Commit { project: ProjectRef, message: String },
    Branch { project: ProjectRef, name: String },
    Checkout { project: ProjectRef, branch: String },
    Branches { project: ProjectRef },
    Log { project: ProjectRef },
    Rollback { project: ProjectRef, commit_id: u64 },
    Merge {
        project: ProjectRef,
        source: String,
        target: String,
    },
    Invite { project: ProjectRef, handle: String },
}

/// What a listing was taken of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "context", rename_all = "snake_case")]
pub enum ListingContext {
    Folder {
        path: Vec<String>,
    },
    Project {
        owner: UserId,
        project: String,
        branch: String,
        path: Vec<String>,
    },
    Shared {
        key: CapabilityKey,
        path: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub commit_id: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    FolderCreated {
        name: String,
    },
    Moved {
        path: Vec<String>,
        /// Set when the new folder is inside a project.
        project: Option<String>,
    },
    /// `left` is None when the cursor was already at the root.
    Up {
        left: Option<String>,
    },
    Listing {
        context: ListingContext,
        page: Page,
    },
    Saved {
        file: FileEntry,
        project: Option<String>,
        /// The implicit commit made for a write inside a project.
        commit_id: Option<u64>,
    },
    Opened {
        file: FileEntry,
    },
    /// Files in listing order; empty when the folder has none.
    OpenedAll {
        files: Vec<FileEntry>,
    },
    Shared {
        key: CapabilityKey,
    },
    ProjectCreated {
        name: String,
    },
    Committed {
        project: String,
        commit_id: u64,
    },
    BranchCreated {
        project: String,
        branch: String,
    },
    SwitchedBranch {
        project: String,
        branch: String,
    },
    Branches {
        project: String,
        current: String,
        names: Vec<String>,
    },
    Log {
        project: String,
        branch: String,
        /// Newest first.
        entries: Vec<LogEntry>,
    },
    RolledBack {
        project: String,
        commit_id: u64,
    },
    Merged {
        project: String,
        source: String,
        target: String,
    },
    Invited {
        project: String,
        user_id: UserId,
        handle: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Transactional front door over a store and a blob store.
#[derive(Debug, Clone)]
pub struct Workspace<P: StateProvider, B: BlobStore> {
    store: Store<P>,
    blobs: B,
    settings: Settings,
}

impl<P: StateProvider, B: BlobStore> Workspace<P, B> {
    pub fn new(store: Store<P>, blobs: B) -> Self {
        Self {
            store,
            blobs,
            settings: Settings::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn store(&self) -> &Store<P> {
        &self.store
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Run one intent as one transaction.
    pub async fn execute(&self, actor: &Actor, intent: Intent) -> Result<Reply, WorkspaceError> {
        tracing::debug!(actor = %actor.id, ?intent, "executing intent");
        self.store
            .transact(|doc| apply(doc, actor, intent, &self.settings))
            .await
    }

    /// Upload `data`, then record it at `at`.
    ///
    /// If recording fails the blob stays in the blob store unreferenced.
    pub async fn put_blob(
        &self,
        actor: &Actor,
        at: Destination,
        kind: FileKind,
        name: Option<String>,
        data: Bytes,
    ) -> Result<Reply, WorkspaceError> {
        let blob_id = self.blobs.store(data).await?;
        self.execute(
            actor,
            Intent::PutBlob {
                at,
                kind,
                name,
                blob_id,
            },
        )
        .await
    }

    /// Listing of a shared folder, `path` being relative to it.
    pub async fn access(
        &self,
        actor: &Actor,
        key: CapabilityKey,
        path: Vec<String>,
        page: usize,
    ) -> Result<Reply, WorkspaceError> {
        self.execute(
            actor,
            Intent::Ls {
                at: Destination::Shared { key, path },
                page,
            },
        )
        .await
    }

    pub async fn fetch_blob(&self, blob_id: &BlobId) -> Result<Bytes, WorkspaceError> {
        Ok(self.blobs.retrieve(blob_id).await?)
    }

    /// Content of `file`: inline text as UTF-8, or the referenced blob.
    pub async fn fetch_content(&self, file: &FileEntry) -> Result<Bytes, WorkspaceError> {
        match (file.inline(), file.blob_id()) {
            (Some(text), _) => Ok(Bytes::from(text.to_string())),
            (None, Some(blob_id)) => self.fetch_blob(blob_id).await,
            (None, None) => Ok(Bytes::new()),
        }
    }

    /// Every file in the folder at `at` together with its content.
    ///
    /// The listing is taken in one transaction; blobs are fetched after
    ///  it, outside the mutation scope.
    pub async fn fetch_all(
        &self,
        actor: &Actor,
        at: Destination,
    ) -> Result<Vec<(FileEntry, Bytes)>, WorkspaceError> {
        let files = match self.execute(actor, Intent::OpenAll { at }).await? {
            Reply::OpenedAll { files } => files,
            other => {
                return Err(WorkspaceError::Invalid(format!(
                    "unexpected reply to a folder fetch: {:?}",
                    other
                )))
            }
        };

        let mut contents = Vec::with_capacity(files.len());
        for file in files {
            let data = self.fetch_content(&file).await?;
            contents.push((file, data));
        }
        tracing::debug!(actor = %actor.id, count = contents.len(), "fetched folder");
        Ok(contents)
    }
}
