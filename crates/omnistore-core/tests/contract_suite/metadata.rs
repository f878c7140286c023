//! Metadata cache semantics: cache-then-push-on-write.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use omnistore_core::{MemoryClient, ObjectClient};

use super::helpers;

fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_set_metadata_is_visible_before_any_write() {
    let adapter = helpers::adapter();

    adapter.set_metadata("f", map(&[("a", "1")]));

    // Deferred-push policy: the local cache answers even though nothing has
    // reached the backend for this key.
    let metadata = adapter.get_metadata("f").await.unwrap();
    assert_eq!(metadata, map(&[("a", "1")]));
}

#[tokio::test]
async fn test_absent_metadata_is_an_empty_mapping() {
    let adapter = helpers::adapter();

    let metadata = adapter.get_metadata("never-touched").await.unwrap();
    assert!(metadata.is_empty());
}

#[tokio::test]
async fn test_cached_metadata_is_pushed_on_write() {
    let client = Arc::new(MemoryClient::with_container(helpers::CONTAINER));
    let adapter = helpers::adapter_on(client.clone());

    adapter.set_metadata("doc.txt", map(&[("owner", "ops"), ("tier", "gold")]));
    adapter.write("doc.txt", Bytes::from("content")).await.unwrap();

    let stat = client
        .stat_object(helpers::CONTAINER, "doc.txt")
        .await
        .unwrap();
    assert_eq!(stat.metadata, map(&[("owner", "ops"), ("tier", "gold")]));
}

#[tokio::test]
async fn test_remote_metadata_is_returned_without_local_cache() {
    let client = Arc::new(MemoryClient::with_container(helpers::CONTAINER));

    // One adapter writes metadata through; a second adapter with a cold
    // cache reads it back from the backend.
    let writer = helpers::adapter_on(client.clone());
    writer.set_metadata("doc.txt", map(&[("owner", "ops")]));
    writer.write("doc.txt", Bytes::from("content")).await.unwrap();

    let reader = helpers::adapter_on(client);
    let metadata = reader.get_metadata("doc.txt").await.unwrap();
    assert_eq!(metadata, map(&[("owner", "ops")]));
}

#[tokio::test]
async fn test_local_cache_wins_over_stale_remote_values() {
    let client = Arc::new(MemoryClient::with_container(helpers::CONTAINER));
    let adapter = helpers::adapter_on(client);

    adapter.set_metadata("doc.txt", map(&[("rev", "1")]));
    adapter.write("doc.txt", Bytes::from("v1")).await.unwrap();

    // Updated locally but not yet pushed: the local value must win.
    adapter.set_metadata("doc.txt", map(&[("rev", "2")]));
    let metadata = adapter.get_metadata("doc.txt").await.unwrap();
    assert_eq!(metadata, map(&[("rev", "2")]));
}

#[tokio::test]
async fn test_content_type_entry_becomes_object_content_type() {
    let client = Arc::new(MemoryClient::with_container(helpers::CONTAINER));
    let adapter = helpers::adapter_on(client.clone());

    adapter.set_metadata(
        "styles.css",
        map(&[("Content-Type", "text/css"), ("owner", "web")]),
    );
    adapter.write("styles.css", Bytes::from("body{}")).await.unwrap();

    let stat = client
        .stat_object(helpers::CONTAINER, "styles.css")
        .await
        .unwrap();
    assert_eq!(stat.content_type.as_deref(), Some("text/css"));
    // The content-type entry is lifted out of the user metadata.
    assert_eq!(stat.metadata, map(&[("owner", "web")]));
}
