//! Rename semantics: clobber protection, success postconditions, and the
//! documented partial-failure window.

use std::sync::Arc;

use bytes::Bytes;
use omnistore_core::{Error, Operation};

use super::helpers::{self, FailingClient};

#[tokio::test]
async fn test_rename_into_existing_target_fails_and_changes_nothing() {
    let adapter = helpers::adapter();

    adapter.write("a.txt", Bytes::from("source")).await.unwrap();
    adapter.write("b.txt", Bytes::from("target")).await.unwrap();

    let err = adapter.rename("a.txt", "b.txt").await.unwrap_err();
    match err {
        Error::AlreadyExists { operation, key } => {
            assert_eq!(operation, Operation::Rename);
            assert_eq!(key, "b.txt");
        }
        other => panic!("Expected AlreadyExists, got {:?}", other),
    }

    // Neither object was touched.
    assert_eq!(adapter.read("a.txt").await.unwrap(), Bytes::from("source"));
    assert_eq!(adapter.read("b.txt").await.unwrap(), Bytes::from("target"));
}

#[tokio::test]
async fn test_rename_moves_content() {
    let adapter = helpers::adapter();
    let content = Bytes::from("payload");

    adapter.write("old/name.bin", content.clone()).await.unwrap();
    adapter.rename("old/name.bin", "new/name.bin").await.unwrap();

    assert!(!adapter.exists("old/name.bin").await.unwrap());
    assert!(adapter.exists("new/name.bin").await.unwrap());
    assert_eq!(adapter.read("new/name.bin").await.unwrap(), content);
}

#[tokio::test]
async fn test_rename_missing_source_is_not_found() {
    let adapter = helpers::adapter();

    let err = adapter.rename("ghost.txt", "b.txt").await.unwrap_err();
    match err {
        Error::NotFound { operation, key } => {
            assert_eq!(operation, Operation::Rename);
            assert_eq!(key, "ghost.txt");
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }

    assert!(!adapter.exists("b.txt").await.unwrap());
}

#[tokio::test]
async fn test_rename_delete_step_failure_leaves_both_objects() {
    let client = Arc::new(FailingClient::new().failing_deletes());
    let adapter = helpers::adapter_on(client);

    let content = Bytes::from("payload");
    adapter.write("a.txt", content.clone()).await.unwrap();

    // The write step succeeded, the delete step failed: the failure is
    // surfaced and no rollback of the target is attempted.
    let err = adapter.rename("a.txt", "b.txt").await.unwrap_err();
    assert!(matches!(
        err,
        Error::StorageFailure {
            operation: Operation::Rename,
            ..
        }
    ));

    assert_eq!(adapter.read("a.txt").await.unwrap(), content);
    assert_eq!(adapter.read("b.txt").await.unwrap(), content);
}
