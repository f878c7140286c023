//! In-memory client for testing.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use chrono::Utc;
use parking_lot::Mutex;

use super::{ClientError, ClientResult, ObjectClient, ObjectStat, ObjectSummary, PutOptions};
use crate::config::AccessPolicy;

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone)]
struct StoredObject {
    content: Bytes,
    content_type: Option<String>,
    metadata: HashMap<String, String>,
    /// HTTP-date (RFC 1123) representation, like real object stores report.
    last_modified: String,
    etag: String,
}

/// In-memory client.
///
/// Containers must be created explicitly (or via the container lifecycle
/// with creation enabled), so tests can exercise resolution against a
/// missing container. Data does not persist between runs.
#[derive(Default)]
pub struct MemoryClient {
    containers: Mutex<HashMap<String, BTreeMap<String, StoredObject>>>,
}

impl MemoryClient {
    /// Create a new in-memory client with no containers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new in-memory client with one pre-created container.
    pub fn with_container(name: impl Into<String>) -> Self {
        let client = Self::new();
        client
            .containers
            .lock()
            .insert(name.into(), BTreeMap::new());
        client
    }

    fn compute_etag(content: &[u8]) -> String {
        format!("{:x}", md5::compute(content))
    }
}

#[async_trait::async_trait]
impl ObjectClient for MemoryClient {
    async fn get_object(&self, container: &str, key: &str) -> ClientResult<Bytes> {
        let containers = self.containers.lock();
        let objects = containers
            .get(container)
            .ok_or_else(|| ClientError::backend(format!("no such container: {}", container)))?;
        objects
            .get(key)
            .map(|o| o.content.clone())
            .ok_or(ClientError::NotFound)
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        content: Bytes,
        options: &PutOptions,
    ) -> ClientResult<()> {
        let mut containers = self.containers.lock();
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| ClientError::backend(format!("no such container: {}", container)))?;
        let etag = Self::compute_etag(&content);
        objects.insert(
            key.to_string(),
            StoredObject {
                content,
                content_type: options.content_type.clone(),
                metadata: options.metadata.clone(),
                last_modified: Utc::now().format(HTTP_DATE).to_string(),
                etag,
            },
        );
        Ok(())
    }

    async fn delete_object(&self, container: &str, key: &str) -> ClientResult<()> {
        let mut containers = self.containers.lock();
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| ClientError::backend(format!("no such container: {}", container)))?;
        objects.remove(key).map(|_| ()).ok_or(ClientError::NotFound)
    }

    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
        max_keys: Option<usize>,
    ) -> ClientResult<Vec<ObjectSummary>> {
        let containers = self.containers.lock();
        let objects = containers
            .get(container)
            .ok_or_else(|| ClientError::backend(format!("no such container: {}", container)))?;

        // BTreeMap iteration is already key-ordered, like S3 listings.
        let mut summaries = Vec::new();
        for (key, object) in objects.iter().filter(|(k, _)| k.starts_with(prefix)) {
            if let Some(max) = max_keys {
                if summaries.len() >= max {
                    break;
                }
            }
            summaries.push(ObjectSummary {
                key: key.clone(),
                last_modified: Some(object.last_modified.clone()),
                size: object.content.len() as u64,
                etag: Some(object.etag.clone()),
                content_type: object.content_type.clone(),
            });
        }
        Ok(summaries)
    }

    async fn stat_object(&self, container: &str, key: &str) -> ClientResult<ObjectStat> {
        let containers = self.containers.lock();
        let objects = containers
            .get(container)
            .ok_or_else(|| ClientError::backend(format!("no such container: {}", container)))?;
        let object = objects.get(key).ok_or(ClientError::NotFound)?;
        Ok(ObjectStat {
            size: object.content.len() as u64,
            last_modified: Some(object.last_modified.clone()),
            etag: Some(object.etag.clone()),
            content_type: object.content_type.clone(),
            metadata: object.metadata.clone(),
        })
    }

    async fn object_exists(&self, container: &str, key: &str) -> ClientResult<bool> {
        let containers = self.containers.lock();
        Ok(containers
            .get(container)
            .is_some_and(|objects| objects.contains_key(key)))
    }

    async fn container_exists(&self, container: &str) -> ClientResult<bool> {
        Ok(self.containers.lock().contains_key(container))
    }

    async fn create_container(&self, container: &str, _access: AccessPolicy) -> ClientResult<bool> {
        self.containers
            .lock()
            .entry(container.to_string())
            .or_default();
        Ok(true)
    }
}
