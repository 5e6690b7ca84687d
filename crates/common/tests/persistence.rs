//! Integration tests for document persistence and transaction failure

mod common;

use ::common::blobs::MemoryBlobStore;
use ::common::error::ErrorKind;
use ::common::store::{FileStateProvider, MemoryStateProvider, StateProvider, Store};
use ::common::workspace::{Destination, Intent, Reply, Workspace};

#[tokio::test]
async fn test_state_survives_reopen() {
    let (ws, temp_dir) = common::setup_file_workspace().await;
    let me = common::alice();
    ws.execute(&me, Intent::InitProject { name: "P.git".to_string() })
        .await
        .unwrap();
    ws.execute(&me, Intent::Cd { name: "P.git".to_string() })
        .await
        .unwrap();
    ws.execute(
        &me,
        Intent::PutText {
            at: Destination::Cwd,
            text: "kept".to_string(),
        },
    )
    .await
    .unwrap();

    let reopened = Workspace::new(
        Store::new(FileStateProvider::new(temp_dir.path().join("state.json"))),
        MemoryBlobStore::new(),
    );
    let listing = reopened
        .execute(&me, Intent::Ls { at: Destination::Cwd, page: 0 })
        .await
        .unwrap();
    let Reply::Listing { page, .. } = listing else {
        panic!("expected a listing");
    };
    assert_eq!(page.total_items, 1);
}

#[tokio::test]
async fn test_document_shape() {
    let ws = common::setup_workspace();
    let me = common::alice();
    common::mkdir(&ws, &me, "a").await;

    let bytes = ws.store().provider().snapshot().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    for key in ["users", "shared_folders", "projects", "usernames"] {
        assert!(value.get(key).is_some(), "missing top-level {}", key);
    }
    assert_eq!(value["usernames"]["alice"], "100");
    assert!(value["users"]["100"]["structure"]["folders"]["a"].is_object());
}

#[tokio::test]
async fn test_legacy_document_loads() {
    let legacy = r#"{
        "users": {
            "100": {
                "current_path": ["Old.git"],
                "structure": {"folders": {"Old.git": {"folders": {}, "files": []}}, "files": []}
            }
        },
        "shared_folders": {},
        "projects": {
            "100": {
                "Old.git": {
                    "branches": {
                        "master": {
                            "structure": {
                                "folders": {},
                                "files": [{"type": "text", "content": "hi", "short_id": "0a0a0a0a", "name": "f"}]
                            },
                            "commits": [{"commit_id": 1, "message": "m1", "structure": {"folders": {}, "files": []}}]
                        }
                    }
                }
            }
        }
    }"#;
    let ws = Workspace::new(
        Store::new(MemoryStateProvider::with_bytes(legacy)),
        MemoryBlobStore::new(),
    );
    let me = common::alice();

    // the cursor sits on an untagged legacy root: it must resolve as a project
    let listing = ws
        .execute(&me, Intent::Ls { at: Destination::Cwd, page: 0 })
        .await
        .unwrap();
    assert_eq!(common::names(&listing), vec!["f"]);

    let reply = ws
        .execute(
            &me,
            Intent::Commit {
                project: ::common::workspace::ProjectRef::own("Old.git"),
                message: "m2".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(matches!(reply, Reply::Committed { commit_id: 2, .. }));
}

#[tokio::test]
async fn test_failed_save_is_storage_failure() {
    let provider = common::FailingSaveProvider::default();
    let ws = Workspace::new(Store::new(provider.clone()), MemoryBlobStore::new());
    let me = common::alice();

    let err = ws
        .execute(&me, Intent::Mkdir { name: "a".to_string() })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageFailure);
    assert!(err.kind().is_retryable());
    assert!(provider.inner.snapshot().is_none());
}

#[tokio::test]
async fn test_rejected_intent_persists_nothing() {
    let ws = common::setup_workspace();
    let me = common::alice();
    common::mkdir(&ws, &me, "a").await;
    let before = ws.store().provider().snapshot().unwrap();

    // a brand new user would be observed, but the intent fails
    let newcomer = ::common::workspace::Actor::new("300").with_handle("carol");
    let err = ws
        .execute(&newcomer, Intent::Cd { name: "missing".to_string() })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(ws.store().provider().snapshot().unwrap(), before);
}

#[tokio::test]
async fn test_corrupt_file_is_not_reset() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("state.json");
    std::fs::write(&path, b"{\"users\": ").unwrap();

    let provider = FileStateProvider::new(&path);
    let ws = Workspace::new(Store::new(provider.clone()), MemoryBlobStore::new());
    let err = ws
        .execute(&common::alice(), Intent::Up)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageFailure);
    assert_eq!(provider.load().await.unwrap().unwrap(), b"{\"users\": ");
}
