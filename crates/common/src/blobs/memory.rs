use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{BlobError, BlobId, BlobStore};

/// In-memory blob store, mostly for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<RwLock<HashMap<BlobId, Bytes>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, data: Bytes) -> Result<BlobId, BlobError> {
        let id = BlobId::new(Uuid::new_v4().simple().to_string());
        self.inner.write().insert(id.clone(), data);
        Ok(id)
    }

    async fn retrieve(&self, id: &BlobId) -> Result<Bytes, BlobError> {
        self.inner
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_retrieve() {
        let store = MemoryBlobStore::new();
        let id = store.store(Bytes::from_static(b"payload")).await.unwrap();
        assert_eq!(store.retrieve(&id).await.unwrap(), Bytes::from_static(b"payload"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_blob() {
        let store = MemoryBlobStore::new();
        let result = store.retrieve(&BlobId::new("nope")).await;
        assert!(matches!(result, Err(BlobError::NotFound(_))));
    }
}
