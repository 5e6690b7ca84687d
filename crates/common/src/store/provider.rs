use std::fmt::Debug;

use async_trait::async_trait;

/// Backing storage for the serialized document.
///
/// Providers move opaque bytes; decoding and the transaction discipline
///  live in [`Store`](super::Store).
#[async_trait]
pub trait StateProvider: Send + Sync + Debug + Clone + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the last saved document.
    ///
    /// # Returns
    /// * `Ok(None)` - Nothing has been saved yet
    /// * `Ok(Some(bytes))` - The complete last saved document
    async fn load(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Replace the saved document.
    ///
    /// Must be atomic: a concurrent or later `load` observes either the
    ///  previous document or `bytes`, never a mix or a truncation.
    async fn save(&self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Try to take the lock that excludes every other process sharing
    ///  this storage, for the length of one transaction.
    ///
    /// # Returns
    /// * `Ok(None)` - Someone else holds it; the caller may retry
    /// * `Ok(Some(lock))` - Held until `lock` is dropped
    ///
    /// Storage that only one process can reach needs no such lock.
    async fn try_exclusive(&self) -> Result<Option<ExclusiveLock>, Self::Error> {
        Ok(Some(ExclusiveLock::default()))
    }
}

/// Provider-level lock held for one transaction. Released on drop.
#[derive(Debug, Default)]
pub struct ExclusiveLock {
    _file: Option<std::fs::File>,
}

impl ExclusiveLock {
    /// Lock backed by an advisory lock on `file`; closing the file
    ///  releases it.
    pub fn on_file(file: std::fs::File) -> Self {
        Self { _file: Some(file) }
    }
}
