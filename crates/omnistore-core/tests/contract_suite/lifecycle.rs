//! Container lifecycle behavior as seen through adapter operations.

use std::sync::Arc;

use bytes::Bytes;
use omnistore_core::{AdapterConfig, Error, MemoryClient, StorageAdapter};

use super::helpers::{self, FailingClient};

fn missing_container_adapter(create: bool) -> StorageAdapter {
    StorageAdapter::new(
        Arc::new(MemoryClient::new()),
        helpers::CONTAINER,
        AdapterConfig {
            create_container_if_missing: create,
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_missing_container_without_creation_fails_every_operation() {
    let adapter = missing_container_adapter(false);

    let err = adapter.read("a.txt").await.unwrap_err();
    assert!(matches!(err, Error::ContainerUnavailable { .. }));

    // The failure is terminal: later operations re-raise it rather than
    // retrying resolution.
    let err = adapter.write("a.txt", Bytes::from("x")).await.unwrap_err();
    match err {
        Error::ContainerUnavailable { container, .. } => {
            assert_eq!(container, helpers::CONTAINER);
        }
        other => panic!("Expected ContainerUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_container_with_creation_succeeds() {
    let adapter = missing_container_adapter(true);

    adapter.write("a.txt", Bytes::from("x")).await.unwrap();

    // The freshly created container answers probes without error.
    assert!(!adapter.exists("anything").await.unwrap());
    assert!(adapter.exists("a.txt").await.unwrap());
}

#[tokio::test]
async fn test_failed_existence_probe_is_container_unavailable() {
    let client = Arc::new(FailingClient::without_container().failing_container_probe());
    let adapter = StorageAdapter::new(
        client,
        helpers::CONTAINER,
        AdapterConfig {
            create_container_if_missing: true,
            ..Default::default()
        },
    );

    // A transport failure during the probe is never treated as "does not
    // exist".
    let err = adapter.read("a.txt").await.unwrap_err();
    match err {
        Error::ContainerUnavailable { reason, .. } => {
            assert!(reason.contains("existence check failed"));
        }
        other => panic!("Expected ContainerUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_first_use_creates_container_once() {
    let client = Arc::new(FailingClient::without_container());
    let adapter = Arc::new(StorageAdapter::new(
        client.clone(),
        helpers::CONTAINER,
        AdapterConfig {
            create_container_if_missing: true,
            ..Default::default()
        },
    ));

    let a = adapter.clone();
    let b = adapter.clone();
    let (left, right) = tokio::join!(
        async move { a.write("left.txt", Bytes::from("l")).await },
        async move { b.write("right.txt", Bytes::from("r")).await },
    );
    left.unwrap();
    right.unwrap();

    assert_eq!(client.create_calls(), 1);
}

#[tokio::test]
async fn test_resolution_happens_once_across_operations() {
    let client = Arc::new(FailingClient::without_container());
    let adapter = StorageAdapter::new(
        client.clone(),
        helpers::CONTAINER,
        AdapterConfig {
            create_container_if_missing: true,
            ..Default::default()
        },
    );

    adapter.write("a.txt", Bytes::from("x")).await.unwrap();
    adapter.read("a.txt").await.unwrap();
    adapter.keys().await.unwrap();

    assert_eq!(client.create_calls(), 1);
}
