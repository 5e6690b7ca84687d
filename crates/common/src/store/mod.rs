//! Whole-document persistence and the mutation scope.
//!
//! Every logical operation is one transaction:
//!
//! 1. acquire the scope: the in-process FIFO mutex, then the provider's
//!    cross-process lock, both within one bounded wait
//!    ([`StoreError::Conflict`] on timeout)
//! 2. load and decode the document
//! 3. run the mutation on that private copy
//! 4. on success encode and save; on failure drop the copy
//! 5. release
//!
//! The only suspension points are the acquire and the provider I/O.
//! The mutation itself is a plain closure and cannot await.

mod file;
mod memory;
mod provider;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

use crate::document::Document;
use crate::error::ErrorKind;

pub use file::FileStateProvider;
pub use memory::MemoryStateProvider;
pub use provider::{ExclusiveLock, StateProvider};

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause between attempts at a provider lock held by another process.
const EXCLUSIVE_RETRY: Duration = Duration::from_millis(5);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("gave up after {waited:?} waiting for the mutation scope")]
    Conflict { waited: Duration },
    #[error("state provider error: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("document codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Conflict { .. } => ErrorKind::Conflict,
            StoreError::Provider(_) | StoreError::Codec(_) => ErrorKind::StorageFailure,
        }
    }
}

/// Transaction scope over a [`StateProvider`].
///
/// The scope is global: one transaction at a time across all users.
///  Clones share the in-process scope; separate stores over the same
///  storage, in this process or another, are kept apart by the
///  provider's exclusive lock.
#[derive(Debug, Clone)]
pub struct Store<P: StateProvider> {
    provider: P,
    scope: Arc<Mutex<()>>,
    lock_timeout: Duration,
}

impl<P: StateProvider> Store<P> {
    pub fn new(provider: P) -> Self {
        Self::with_timeout(provider, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_timeout(provider: P, lock_timeout: Duration) -> Self {
        Self {
            provider,
            scope: Arc::new(Mutex::new(())),
            lock_timeout,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Run `mutate` against the current document and persist the result.
    ///
    /// If `mutate` fails nothing is saved, and the next transaction sees
    ///  the document exactly as it was before this one.
    pub async fn transact<T, E, F>(&self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut Document) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _scope = self.acquire().await?;
        let mut document = self.load().await?;

        let output = match mutate(&mut document) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("transaction aborted, discarding changes");
                return Err(e);
            }
        };

        self.save(&document).await?;
        tracing::debug!("transaction committed");
        Ok(output)
    }

    /// Run `inspect` against the current document without saving.
    ///
    /// Reads take the same scope as writes, so they never interleave
    ///  with a save.
    pub async fn read<T, E, F>(&self, inspect: F) -> Result<T, E>
    where
        F: FnOnce(&Document) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _scope = self.acquire().await?;
        let document = self.load().await?;
        inspect(&document)
    }

    async fn acquire(&self) -> Result<(MutexGuard<'_, ()>, ExclusiveLock), StoreError> {
        let deadline = Instant::now() + self.lock_timeout;
        let guard = match tokio::time::timeout_at(deadline, self.scope.lock()).await {
            Ok(guard) => guard,
            Err(_) => return Err(self.contended()),
        };

        loop {
            let attempt = self.provider.try_exclusive().await.map_err(|e| {
                tracing::error!("failed to take the storage lock: {}", e);
                StoreError::Provider(Box::new(e))
            })?;
            if let Some(lock) = attempt {
                return Ok((guard, lock));
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(self.contended());
            }
            tokio::time::sleep_until((now + EXCLUSIVE_RETRY).min(deadline)).await;
        }
    }

    fn contended(&self) -> StoreError {
        tracing::warn!(
            waited = ?self.lock_timeout,
            "mutation scope contended, giving up"
        );
        StoreError::Conflict {
            waited: self.lock_timeout,
        }
    }

    async fn load(&self) -> Result<Document, StoreError> {
        let bytes = self.provider.load().await.map_err(|e| {
            tracing::error!("failed to load document: {}", e);
            StoreError::Provider(Box::new(e))
        })?;
        match bytes {
            None => Ok(Document::new()),
            Some(bytes) => Document::decode(&bytes).map_err(|e| {
                tracing::error!("stored document does not decode: {}", e);
                StoreError::Codec(e)
            }),
        }
    }

    async fn save(&self, document: &Document) -> Result<(), StoreError> {
        let bytes = document.encode()?;
        self.provider.save(&bytes).await.map_err(|e| {
            tracing::error!("failed to save document: {}", e);
            StoreError::Provider(Box::new(e))
        })
    }
}
