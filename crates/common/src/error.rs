use std::fmt;

/// Coarse classification of every failure the core can surface.
///
/// Module errors stay specific (see [`TreeError`](crate::tree::TreeError),
/// [`StoreError`](crate::store::StoreError),
/// [`WorkspaceError`](crate::workspace::WorkspaceError)); each of them maps
/// onto one of these kinds so a transport can decide how to react without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing path, branch, commit, project, user or handle.
    NotFound,
    /// Duplicate name at creation time.
    AlreadyExists,
    /// Malformed id, out-of-range commit id, or an operation that makes no
    /// sense at the current location.
    InvalidArgument,
    /// Project access by a non-member.
    PermissionDenied,
    /// The mutation scope could not be acquired in time. Retryable.
    Conflict,
    /// Load or save of the persisted document failed.
    StorageFailure,
}

impl ErrorKind {
    /// Whether retrying the same request unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Conflict | ErrorKind::StorageFailure)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::PermissionDenied => "permission denied",
            ErrorKind::Conflict => "conflict",
            ErrorKind::StorageFailure => "storage failure",
        };
        write!(f, "{}", name)
    }
}
