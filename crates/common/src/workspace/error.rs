use crate::blobs::BlobError;
use crate::error::ErrorKind;
use crate::ids::ShortId;
use crate::store::StoreError;
use crate::tree::TreeError;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("project already exists: {0}")]
    ProjectExists(String),
    #[error("branch not found: {0}")]
    BranchNotFound(String),
    #[error("branch already exists: {0}")]
    BranchExists(String),
    #[error("commit {commit_id} is outside 1..={len}")]
    CommitOutOfRange { commit_id: u64, len: usize },
    #[error("no file with short id {0} here")]
    FileNotFound(ShortId),
    #[error("no such share key")]
    ShareNotFound,
    #[error("handle '{0}' has never been seen")]
    UnknownHandle(String),
    #[error("'{0}' is already a member of this project")]
    AlreadyMember(String),
    #[error("not a member of project {0}")]
    NotMember(String),
    #[error("only the project owner may {0}")]
    OwnerOnly(&'static str),
    #[error("shared folders are read-only")]
    ReadOnly,
    #[error("{0}")]
    Invalid(String),
}

impl WorkspaceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkspaceError::Tree(e) => e.kind(),
            WorkspaceError::Store(e) => e.kind(),
            WorkspaceError::Blob(e) => e.kind(),
            WorkspaceError::UserNotFound(_)
            | WorkspaceError::ProjectNotFound(_)
            | WorkspaceError::BranchNotFound(_)
            | WorkspaceError::FileNotFound(_)
            | WorkspaceError::ShareNotFound
            | WorkspaceError::UnknownHandle(_) => ErrorKind::NotFound,
            WorkspaceError::ProjectExists(_)
            | WorkspaceError::BranchExists(_)
            | WorkspaceError::AlreadyMember(_) => ErrorKind::AlreadyExists,
            WorkspaceError::CommitOutOfRange { .. } | WorkspaceError::Invalid(_) => {
                ErrorKind::InvalidArgument
            }
            WorkspaceError::NotMember(_)
            | WorkspaceError::OwnerOnly(_)
            | WorkspaceError::ReadOnly => ErrorKind::PermissionDenied,
        }
    }
}
