use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tokio::fs;

use super::provider::{ExclusiveLock, StateProvider};

/// JSON document on local disk.
///
/// Saves go to a uniquely named sibling temp file which is synced and then
///  renamed over the target, so a reader sees the old file or the new one,
///  never a partial write. Transactions from separate processes are kept
///  apart by an advisory lock on a sibling `.<name>.lock` file.
#[derive(Debug, Clone)]
pub struct FileStateProvider {
    path: PathBuf,
}

impl FileStateProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "state".to_string());
        self.path.with_file_name(format!(".{}.{}", name, suffix))
    }

    pub fn lock_path(&self) -> PathBuf {
        self.sibling("lock")
    }

    fn parent(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[async_trait]
impl StateProvider for FileStateProvider {
    type Error = io::Error;

    async fn load(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn save(&self, bytes: &[u8]) -> Result<(), Self::Error> {
        let parent = self.parent();
        fs::create_dir_all(&parent).await?;

        let path = self.path.clone();
        let data = bytes.to_vec();
        tokio::task::spawn_blocking(move || -> io::Result<()> {
            let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
            temp.write_all(&data)?;
            temp.as_file().sync_all()?;
            temp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(io::Error::other)??;

        tracing::trace!(path = %self.path.display(), len = bytes.len(), "saved document");
        Ok(())
    }

    async fn try_exclusive(&self) -> Result<Option<ExclusiveLock>, Self::Error> {
        fs::create_dir_all(self.parent()).await?;

        let lock_path = self.lock_path();
        tokio::task::spawn_blocking(move || -> io::Result<Option<ExclusiveLock>> {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&lock_path)?;
            match file.try_lock_exclusive() {
                Ok(()) => Ok(Some(ExclusiveLock::on_file(file))),
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(io::Error::other)?
    }
}
