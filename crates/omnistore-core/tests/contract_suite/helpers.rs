//! Test helper utilities.
//!
//! Provides adapter constructors and a scripted failing client used across
//! the contract tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use omnistore_core::{
    AccessPolicy, AdapterConfig, ClientError, ClientResult, MemoryClient, ObjectClient,
    ObjectStat, ObjectSummary, PutOptions, StorageAdapter,
};

pub const CONTAINER: &str = "test-container";

/// Adapter over a fresh in-memory client with a pre-created container.
pub fn adapter() -> StorageAdapter {
    StorageAdapter::with_defaults(Arc::new(MemoryClient::with_container(CONTAINER)), CONTAINER)
}

/// Adapter with explicit configuration over a pre-created container.
pub fn adapter_with_config(config: AdapterConfig) -> StorageAdapter {
    StorageAdapter::new(
        Arc::new(MemoryClient::with_container(CONTAINER)),
        CONTAINER,
        config,
    )
}

/// Adapter sharing the given client, with default configuration.
pub fn adapter_on(client: Arc<dyn ObjectClient>) -> StorageAdapter {
    StorageAdapter::with_defaults(client, CONTAINER)
}

/// Client decorator that fails selected primitives with backend errors and
/// counts container creations.
#[derive(Default)]
pub struct FailingClient {
    inner: MemoryClient,
    fail_gets: bool,
    fail_puts: bool,
    fail_deletes: bool,
    fail_lists: bool,
    fail_container_probe: bool,
    creates: AtomicUsize,
}

impl FailingClient {
    pub fn new() -> Self {
        Self {
            inner: MemoryClient::with_container(CONTAINER),
            ..Default::default()
        }
    }

    /// Like [`new`](FailingClient::new), but with no container yet.
    pub fn without_container() -> Self {
        Self::default()
    }

    pub fn failing_gets(mut self) -> Self {
        self.fail_gets = true;
        self
    }

    pub fn failing_puts(mut self) -> Self {
        self.fail_puts = true;
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn failing_lists(mut self) -> Self {
        self.fail_lists = true;
        self
    }

    pub fn failing_container_probe(mut self) -> Self {
        self.fail_container_probe = true;
        self
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    fn injected(what: &str) -> ClientError {
        ClientError::backend(format!("injected failure: {}", what))
    }
}

#[async_trait]
impl ObjectClient for FailingClient {
    async fn get_object(&self, container: &str, key: &str) -> ClientResult<Bytes> {
        if self.fail_gets {
            return Err(Self::injected("get"));
        }
        self.inner.get_object(container, key).await
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        content: Bytes,
        options: &PutOptions,
    ) -> ClientResult<()> {
        if self.fail_puts {
            return Err(Self::injected("put"));
        }
        self.inner.put_object(container, key, content, options).await
    }

    async fn delete_object(&self, container: &str, key: &str) -> ClientResult<()> {
        if self.fail_deletes {
            return Err(Self::injected("delete"));
        }
        self.inner.delete_object(container, key).await
    }

    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
        max_keys: Option<usize>,
    ) -> ClientResult<Vec<ObjectSummary>> {
        if self.fail_lists {
            return Err(Self::injected("list"));
        }
        self.inner.list_objects(container, prefix, max_keys).await
    }

    async fn stat_object(&self, container: &str, key: &str) -> ClientResult<ObjectStat> {
        self.inner.stat_object(container, key).await
    }

    async fn object_exists(&self, container: &str, key: &str) -> ClientResult<bool> {
        self.inner.object_exists(container, key).await
    }

    async fn container_exists(&self, container: &str) -> ClientResult<bool> {
        if self.fail_container_probe {
            return Err(Self::injected("container probe"));
        }
        self.inner.container_exists(container).await
    }

    async fn create_container(&self, container: &str, access: AccessPolicy) -> ClientResult<bool> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create_container(container, access).await
    }
}
