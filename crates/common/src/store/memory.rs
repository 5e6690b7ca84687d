use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::provider::StateProvider;

/// In-memory provider holding the serialized document.
///
/// Keeps bytes rather than a live `Document` so every load goes through
///  the same decode path as the file provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateProvider {
    inner: Arc<RwLock<Option<Vec<u8>>>>,
}

impl MemoryStateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously serialized bytes.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(bytes.into()))),
        }
    }

    /// Copy of whatever was saved last.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.inner.read().clone()
    }
}

#[async_trait]
impl StateProvider for MemoryStateProvider {
    type Error = Infallible;

    async fn load(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.inner.read().clone())
    }

    async fn save(&self, bytes: &[u8]) -> Result<(), Self::Error> {
        *self.inner.write() = Some(bytes.to_vec());
        Ok(())
    }
}
