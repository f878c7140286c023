//! The uniform adapter contract and its derived operations.
//!
//! [`StorageAdapter`] is written once against the
//! [`ObjectClient`](crate::client::ObjectClient) capability interface and is
//! the sole error-translation boundary: backend-native failures never cross
//! it unwrapped. Every operation first resolves the backing container
//! through the memoized lifecycle.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::client::{ClientError, ObjectClient, PutOptions};
use crate::config::AdapterConfig;
use crate::container::{ContainerHandle, ContainerLifecycle};
use crate::error::{Error, Operation};
use crate::mime;
use crate::Result;

const CONTENT_TYPE_KEY: &str = "content-type";

/// Uniform storage adapter over one backend container.
///
/// One adapter owns exactly one container. The container handle is resolved
/// on first use and reused for the adapter's lifetime; the local metadata
/// cache follows a cache-then-push-on-write policy (see [`set_metadata`]).
///
/// [`set_metadata`]: StorageAdapter::set_metadata
pub struct StorageAdapter {
    client: Arc<dyn ObjectClient>,
    container: ContainerLifecycle,
    config: AdapterConfig,
    metadata: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl StorageAdapter {
    /// Create an adapter for the named container.
    pub fn new(
        client: Arc<dyn ObjectClient>,
        container: impl Into<String>,
        config: AdapterConfig,
    ) -> Self {
        let container = ContainerLifecycle::new(
            container,
            config.create_container_if_missing,
            config.default_access_policy,
        );
        Self {
            client,
            container,
            config,
            metadata: Mutex::new(HashMap::new()),
        }
    }

    /// Create an adapter with the default configuration.
    pub fn with_defaults(client: Arc<dyn ObjectClient>, container: impl Into<String>) -> Self {
        Self::new(client, container, AdapterConfig::default())
    }

    /// The name of the backing container.
    pub fn container_name(&self) -> &str {
        self.container.name()
    }

    /// The adapter's configuration.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    async fn resolve(&self) -> Result<ContainerHandle> {
        self.container.resolve(self.client.as_ref()).await
    }

    /// Prepend the configured path prefix to a key.
    fn full_key(&self, key: &str) -> String {
        if self.config.path_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.config.path_prefix.trim_end_matches('/'), key)
        }
    }

    /// Strip the configured path prefix from a backend key; entries outside
    /// the prefix are dropped from listings.
    fn strip_key(&self, backend_key: &str) -> Option<String> {
        if self.config.path_prefix.is_empty() {
            return Some(backend_key.to_string());
        }
        let prefix = format!("{}/", self.config.path_prefix.trim_end_matches('/'));
        backend_key
            .strip_prefix(&prefix)
            .map(|stripped| stripped.to_string())
    }

    fn map_err(operation: Operation, key: &str, err: ClientError) -> Error {
        match err {
            ClientError::NotFound => Error::not_found(operation, key),
            ClientError::Backend(source) => Error::StorageFailure {
                operation,
                key: Some(key.to_string()),
                source,
            },
        }
    }

    /// Coerce any client failure, including an unexpected not-found signal,
    /// into a `StorageFailure`.
    fn failure(operation: Operation, key: Option<&str>, err: ClientError) -> Error {
        match err {
            ClientError::Backend(source) => Error::StorageFailure {
                operation,
                key: key.map(str::to_string),
                source,
            },
            other => Error::storage_failure(operation, key, other.to_string()),
        }
    }

    /// Build the put options for `key`, merging cached metadata and, when
    /// enabled, a locally detected content type.
    fn put_options(&self, key: &str, content: &[u8]) -> PutOptions {
        let mut options = PutOptions {
            access: Some(self.config.default_access_policy),
            ..Default::default()
        };

        if let Some(mut cached) = self.metadata.lock().get(key).cloned() {
            if let Some(name) = cached
                .keys()
                .find(|k| k.eq_ignore_ascii_case(CONTENT_TYPE_KEY))
                .cloned()
            {
                options.content_type = cached.remove(&name);
            }
            options.metadata = cached;
        }

        if options.content_type.is_none() && self.config.detect_content_type {
            options.content_type = Some(mime::detect_content_type(key, content));
        }

        options
    }

    /// Read an object's content.
    ///
    /// # Errors
    ///
    /// `NotFound` when the key does not exist, `StorageFailure` for any
    /// other backend failure.
    pub async fn read(&self, key: &str) -> Result<Bytes> {
        let handle = self.resolve().await?;
        debug!("read: {}/{}", handle.name(), key);

        self.client
            .get_object(handle.name(), &self.full_key(key))
            .await
            .map_err(|e| Self::map_err(Operation::Read, key, e))
    }

    /// Write an object, returning the number of bytes written.
    ///
    /// The byte count is computed from the content itself, not from backend
    /// headers. Locally cached metadata for `key` is merged into the push;
    /// when content-type detection is enabled and no explicit type is
    /// cached, a sniffed type is attached.
    pub async fn write(&self, key: &str, content: Bytes) -> Result<u64> {
        let handle = self.resolve().await?;
        let written = content.len() as u64;
        let options = self.put_options(key, &content);
        debug!("write: {}/{} ({} bytes)", handle.name(), key, written);

        self.client
            .put_object(handle.name(), &self.full_key(key), content, &options)
            .await
            .map_err(|e| Self::failure(Operation::Write, Some(key), e))?;

        Ok(written)
    }

    /// Check whether an object exists.
    ///
    /// Plain absence is `Ok(false)`, never an error; only unambiguously
    /// infrastructural failures raise `StorageFailure`.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let handle = self.resolve().await?;

        match self
            .client
            .object_exists(handle.name(), &self.full_key(key))
            .await
        {
            Ok(present) => Ok(present),
            Err(ClientError::NotFound) => Ok(false),
            Err(err) => Err(Self::failure(Operation::Exists, Some(key), err)),
        }
    }

    /// Delete an object.
    ///
    /// # Errors
    ///
    /// `NotFound` when the backend signals the key was absent (backends with
    /// idempotent deletes cannot signal this), `StorageFailure` otherwise.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let handle = self.resolve().await?;
        debug!("delete: {}/{}", handle.name(), key);

        self.client
            .delete_object(handle.name(), &self.full_key(key))
            .await
            .map_err(|e| Self::map_err(Operation::Delete, key, e))
    }

    /// Rename an object via copy-then-delete.
    ///
    /// Not atomic: the target is pre-checked (`AlreadyExists` if present —
    /// rename never silently clobbers), then the source content is read,
    /// written to the target, and the source deleted. If the target write
    /// succeeds but the source delete fails, the delete's `StorageFailure`
    /// is surfaced and both objects remain; no compensating delete of the
    /// target is attempted, since compensation can itself fail.
    pub async fn rename(&self, source: &str, target: &str) -> Result<()> {
        let handle = self.resolve().await?;
        debug!("rename: {}/{} -> {}", handle.name(), source, target);

        // (a) clobber pre-check
        let target_exists = match self
            .client
            .object_exists(handle.name(), &self.full_key(target))
            .await
        {
            Ok(present) => present,
            Err(ClientError::NotFound) => false,
            Err(err) => return Err(Self::failure(Operation::Rename, Some(target), err)),
        };
        if target_exists {
            return Err(Error::already_exists(Operation::Rename, target));
        }

        // (b) read source
        let content = self
            .client
            .get_object(handle.name(), &self.full_key(source))
            .await
            .map_err(|e| Self::map_err(Operation::Rename, source, e))?;

        // (c) write target
        let options = self.put_options(target, &content);
        self.client
            .put_object(handle.name(), &self.full_key(target), content, &options)
            .await
            .map_err(|e| Self::failure(Operation::Rename, Some(target), e))?;

        // (d) delete source
        self.client
            .delete_object(handle.name(), &self.full_key(source))
            .await
            .map_err(|e| Self::failure(Operation::Rename, Some(source), e))
    }

    /// List all keys in ascending lexicographic order, deduplicated.
    ///
    /// The ordering is deterministic regardless of backend enumeration
    /// order: a final sort always runs.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let handle = self.resolve().await?;

        let summaries = self
            .client
            .list_objects(handle.name(), &self.full_key(""), None)
            .await
            .map_err(|e| Self::failure(Operation::Keys, None, e))?;

        let mut keys: Vec<String> = summaries
            .into_iter()
            .filter_map(|s| self.strip_key(&s.key))
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    /// List keys starting with `prefix`, deduplicated, in backend order.
    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let handle = self.resolve().await?;

        let summaries = self
            .client
            .list_objects(handle.name(), &self.full_key(prefix), None)
            .await
            .map_err(|e| Self::failure(Operation::ListKeys, Some(prefix), e))?;

        let mut seen = HashSet::new();
        Ok(summaries
            .into_iter()
            .filter_map(|s| self.strip_key(&s.key))
            .filter(|key| seen.insert(key.clone()))
            .collect())
    }

    /// Last-modified time of an object as Unix seconds (UTC).
    ///
    /// The backend's string representation (RFC 1123 HTTP-date or RFC 3339)
    /// is parsed exactly; values are always interpreted as UTC.
    pub async fn mtime(&self, key: &str) -> Result<i64> {
        let stat = self.stat(Operation::Mtime, key).await?;

        let raw = stat.last_modified.ok_or_else(|| {
            Error::storage_failure(
                Operation::Mtime,
                Some(key),
                "backend reported no last-modified time".to_string(),
            )
        })?;

        parse_last_modified(&raw)
            .map_err(|e| Error::storage_failure(Operation::Mtime, Some(key), e.to_string()))
    }

    /// Content length of an object in bytes.
    pub async fn size(&self, key: &str) -> Result<u64> {
        let stat = self.stat(Operation::Size, key).await?;
        Ok(stat.size)
    }

    /// Backend-reported entity tag, verbatim — never recomputed locally.
    pub async fn checksum(&self, key: &str) -> Result<String> {
        let stat = self.stat(Operation::Checksum, key).await?;

        stat.etag.ok_or_else(|| {
            Error::storage_failure(
                Operation::Checksum,
                Some(key),
                "backend reported no entity tag".to_string(),
            )
        })
    }

    /// Content type of an object.
    ///
    /// Returns the backend-reported type. When the backend reports none and
    /// content-type detection is enabled, the content is fetched and a
    /// best-guess is computed from its bytes.
    pub async fn mime_type(&self, key: &str) -> Result<String> {
        let stat = self.stat(Operation::MimeType, key).await?;

        if let Some(content_type) = stat.content_type.filter(|ct| !ct.is_empty()) {
            return Ok(content_type);
        }

        if self.config.detect_content_type {
            let handle = self.resolve().await?;
            let content = self
                .client
                .get_object(handle.name(), &self.full_key(key))
                .await
                .map_err(|e| Self::map_err(Operation::MimeType, key, e))?;
            return Ok(mime::detect_content_type(key, &content));
        }

        Err(Error::storage_failure(
            Operation::MimeType,
            Some(key),
            "backend reported no content type and detection is disabled".to_string(),
        ))
    }

    /// Store metadata for `key` in the local cache.
    ///
    /// Cache-then-push-on-write policy: the values are not pushed remotely
    /// here; they are merged into the next [`write`](StorageAdapter::write)
    /// for the same key. A `content-type` entry (case-insensitive) becomes
    /// the object's content type on that write.
    pub fn set_metadata(&self, key: &str, metadata: HashMap<String, String>) {
        self.metadata.lock().insert(key.to_string(), metadata);
    }

    /// Metadata for `key`: the locally cached mapping if present, else the
    /// backend's. Total absence yields an empty mapping, never an error.
    pub async fn get_metadata(&self, key: &str) -> Result<HashMap<String, String>> {
        let handle = self.resolve().await?;

        if let Some(cached) = self.metadata.lock().get(key).cloned() {
            return Ok(cached);
        }

        match self
            .client
            .stat_object(handle.name(), &self.full_key(key))
            .await
        {
            Ok(stat) => Ok(stat.metadata),
            Err(ClientError::NotFound) => Ok(HashMap::new()),
            Err(err) => Err(Self::failure(Operation::Metadata, Some(key), err)),
        }
    }

    /// Whether at least one object exists under `key + "/"`.
    ///
    /// No backend in scope has a true directory concept; this is emulated
    /// with a prefix listing capped at one result.
    pub async fn is_directory(&self, key: &str) -> Result<bool> {
        let handle = self.resolve().await?;
        let prefix = format!("{}/", key.trim_end_matches('/'));

        match self
            .client
            .list_objects(handle.name(), &self.full_key(&prefix), Some(1))
            .await
        {
            Ok(entries) => Ok(!entries.is_empty()),
            Err(ClientError::NotFound) => Ok(false),
            Err(err) => Err(Self::failure(Operation::IsDirectory, Some(key), err)),
        }
    }

    async fn stat(&self, operation: Operation, key: &str) -> Result<crate::client::ObjectStat> {
        let handle = self.resolve().await?;

        self.client
            .stat_object(handle.name(), &self.full_key(key))
            .await
            .map_err(|e| Self::map_err(operation, key, e))
    }
}

/// Parse a backend last-modified string into Unix seconds.
///
/// Accepts RFC 1123 HTTP-dates (via the RFC 2822 parser) and RFC 3339;
/// offsets are honored and the result is UTC.
fn parse_last_modified(raw: &str) -> std::result::Result<i64, chrono::ParseError> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc).timestamp())
}
