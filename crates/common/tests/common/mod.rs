//! Shared helpers for workspace integration tests
#![allow(dead_code)]

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use ::common::blobs::{FsBlobStore, MemoryBlobStore};
use ::common::store::{FileStateProvider, MemoryStateProvider, StateProvider, Store};
use ::common::tree::ListItem;
use ::common::workspace::{Actor, Destination, Intent, ProjectRef, Reply, Workspace};

pub type MemoryWorkspace = Workspace<MemoryStateProvider, MemoryBlobStore>;

/// Route core tracing to the test writer; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Workspace over in-memory state and blobs
pub fn setup_workspace() -> MemoryWorkspace {
    init_tracing();
    Workspace::new(Store::new(MemoryStateProvider::new()), MemoryBlobStore::new())
}

/// Workspace over a state file and a blob directory inside a temp dir
pub async fn setup_file_workspace() -> (Workspace<FileStateProvider, FsBlobStore>, TempDir) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let provider = FileStateProvider::new(temp_dir.path().join("state.json"));
    let blobs = FsBlobStore::open(temp_dir.path().join("blobs")).await.unwrap();
    (Workspace::new(Store::new(provider), blobs), temp_dir)
}

pub fn alice() -> Actor {
    Actor::new("100").with_handle("Alice")
}

pub fn bob() -> Actor {
    Actor::new("200").with_handle("@bob")
}

pub fn names(reply: &Reply) -> Vec<String> {
    match reply {
        Reply::Listing { page, .. } => page.items.iter().map(|i| i.name().to_string()).collect(),
        other => panic!("expected a listing, got {:?}", other),
    }
}

pub fn items(reply: &Reply) -> Vec<ListItem> {
    match reply {
        Reply::Listing { page, .. } => page.items.clone(),
        other => panic!("expected a listing, got {:?}", other),
    }
}

pub async fn mkdir<P: StateProvider>(ws: &Workspace<P, MemoryBlobStore>, actor: &Actor, name: &str) {
    ws.execute(actor, Intent::Mkdir { name: name.to_string() })
        .await
        .unwrap();
}

pub async fn cd<P: StateProvider>(ws: &Workspace<P, MemoryBlobStore>, actor: &Actor, name: &str) {
    ws.execute(actor, Intent::Cd { name: name.to_string() })
        .await
        .unwrap();
}

pub async fn put_text<P: StateProvider>(
    ws: &Workspace<P, MemoryBlobStore>,
    actor: &Actor,
    at: Destination,
    text: &str,
) -> Reply {
    ws.execute(
        actor,
        Intent::PutText {
            at,
            text: text.to_string(),
        },
    )
    .await
    .unwrap()
}

/// Owner's project, created in the owner's root folder
pub async fn init_project<P: StateProvider>(
    ws: &Workspace<P, MemoryBlobStore>,
    actor: &Actor,
    name: &str,
) -> ProjectRef {
    ws.execute(actor, Intent::InitProject { name: name.to_string() })
        .await
        .unwrap();
    ProjectRef::of(actor.id.clone(), name)
}

/// Provider whose saves always fail
#[derive(Debug, Clone, Default)]
pub struct FailingSaveProvider {
    pub inner: MemoryStateProvider,
}

#[async_trait]
impl StateProvider for FailingSaveProvider {
    type Error = io::Error;

    async fn load(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.inner.load().await.unwrap_or_default())
    }

    async fn save(&self, _bytes: &[u8]) -> Result<(), Self::Error> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }
}

/// Provider that stalls on every load, holding the mutation scope
#[derive(Debug, Clone, Default)]
pub struct SlowProvider {
    pub inner: MemoryStateProvider,
    pub delay: Duration,
}

#[async_trait]
impl StateProvider for SlowProvider {
    type Error = std::convert::Infallible;

    async fn load(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        tokio::time::sleep(self.delay).await;
        self.inner.load().await
    }

    async fn save(&self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.inner.save(bytes).await
    }
}
