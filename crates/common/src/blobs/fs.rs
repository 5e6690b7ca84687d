use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use super::{BlobError, BlobId, BlobStore};

/// Blob store keeping one file per blob under a directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (and create if needed) a blob directory.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, BlobError> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, id: &BlobId) -> Option<PathBuf> {
        // ids are ours; anything that could escape the directory is not
        let valid = !id.as_str().is_empty()
            && id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.root.join(id.as_str()))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(&self, data: Bytes) -> Result<BlobId, BlobError> {
        let id = BlobId::new(Uuid::new_v4().simple().to_string());
        let path = self.root.join(id.as_str());
        let tmp = self.root.join(format!(".{}.tmp", id.as_str()));
        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(blob = %id, bytes = data.len(), "stored blob");
        Ok(id)
    }

    async fn retrieve(&self, id: &BlobId) -> Result<Bytes, BlobError> {
        let path = self
            .blob_path(id)
            .ok_or_else(|| BlobError::NotFound(id.clone()))?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Err(BlobError::NotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }
}
