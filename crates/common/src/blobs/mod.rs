//! Binary payload storage.
//!
//! The tree never holds binary content. A blob is handed to a
//! [`BlobStore`] first; the returned [`BlobId`] is what ends up inside the
//! [`FileEntry`](crate::tree::FileEntry). Transfers happen before the
//! transaction that records the reference, so the mutation scope is never
//! held across a blob upload.

mod fs;
mod memory;

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

/// Opaque reference into a blob store.
///
/// Older documents stored numeric message ids here; those are accepted on
/// load and kept as their decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawBlobId", into = "String")]
pub struct BlobId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBlobId {
    Text(String),
    Number(u64),
}

impl From<RawBlobId> for BlobId {
    fn from(raw: RawBlobId) -> Self {
        match raw {
            RawBlobId::Text(text) => BlobId(text),
            RawBlobId::Number(number) => BlobId(number.to_string()),
        }
    }
}

impl From<BlobId> for String {
    fn from(id: BlobId) -> Self {
        id.0
    }
}

impl BlobId {
    pub fn new(id: impl Into<String>) -> Self {
        BlobId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(BlobId),
    #[error("blob io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlobError {
    pub fn kind(&self) -> crate::error::ErrorKind {
        match self {
            BlobError::NotFound(_) => crate::error::ErrorKind::NotFound,
            BlobError::Io(_) => crate::error::ErrorKind::StorageFailure,
        }
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync + fmt::Debug + Clone + 'static {
    /// Store a payload and return the id it can be retrieved by.
    async fn store(&self, data: Bytes) -> Result<BlobId, BlobError>;

    /// Fetch a payload previously stored under `id`.
    async fn retrieve(&self, id: &BlobId) -> Result<Bytes, BlobError>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_blob_id_accepts_legacy_numbers() {
        let id: BlobId = serde_json::from_str("4821").unwrap();
        assert_eq!(id.as_str(), "4821");

        let id: BlobId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.as_str(), "abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
