//! Backend capability interface and client implementations.
//!
//! This module defines the minimal primitive operation set a backend client
//! must expose, and provides clients for:
//!
//! - **S3**: AWS S3 and S3-compatible services (MinIO, Ceph RGW, Aliyun OSS)
//! - **Filesystem**: local filesystem storage
//! - **Memory**: in-memory storage (for testing)
//!
//! The adapter contract is written once against [`ObjectClient`]; each client
//! owns the translation from native SDK calls and errors into this shape,
//! including normalizing its backend's "not found" signaling into
//! [`ClientError::NotFound`].

mod config;
mod filesystem;
mod memory;
mod s3;

pub use config::ClientConfig;
pub use filesystem::FilesystemClient;
pub use memory::MemoryClient;
pub use s3::{S3Client, S3Config};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::config::AccessPolicy;
use crate::error::BackendCause;
use crate::Result;

/// Result type for client primitives.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Error shape every client normalizes its native failures into.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The addressed object (or container) does not exist.
    #[error("not found")]
    NotFound,

    /// Any other backend-native failure, preserved as the original cause.
    #[error("backend error: {0}")]
    Backend(#[source] BackendCause),
}

impl ClientError {
    /// Wrap a backend-native cause.
    pub fn backend(source: impl Into<BackendCause>) -> Self {
        ClientError::Backend(source.into())
    }
}

/// Summary entry returned by [`ObjectClient::list_objects`].
#[derive(Debug, Clone)]
pub struct ObjectSummary {
    /// Full backend key of the object.
    pub key: String,
    /// Backend-native last-modified representation, if reported.
    pub last_modified: Option<String>,
    /// Content length in bytes.
    pub size: u64,
    /// Entity tag, if reported.
    pub etag: Option<String>,
    /// Content type, if reported (most list APIs omit it).
    pub content_type: Option<String>,
}

/// Metadata-only record returned by [`ObjectClient::stat_object`].
///
/// `last_modified` carries the backend's native string representation
/// (HTTP-date or RFC 3339); parsing it is the adapter's job, since the
/// format varies by backend.
#[derive(Debug, Clone, Default)]
pub struct ObjectStat {
    pub size: u64,
    pub last_modified: Option<String>,
    pub etag: Option<String>,
    pub content_type: Option<String>,
    /// User metadata attached to the object (string to string, keys unique).
    pub metadata: HashMap<String, String>,
}

/// Options attached to [`ObjectClient::put_object`].
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Explicit content type for the object.
    pub content_type: Option<String>,
    /// Access policy for the written object, where the backend supports one.
    pub access: Option<AccessPolicy>,
    /// User metadata to attach, where the backend supports headers.
    pub metadata: HashMap<String, String>,
}

/// Minimal primitive set a backend client must expose.
///
/// Absence is signaled with [`ClientError::NotFound`] regardless of how the
/// native SDK reports it (typed exception, HTTP status, sentinel). Probe
/// operations (`object_exists`, `container_exists`) return booleans;
/// backends that cannot distinguish absence from a transient response
/// failure fold the ambiguity into `false`, keeping probes cheap to poll and
/// letting container resolution fall through to its idempotent creation
/// branch. Transport-level failures are never folded.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Fetch an object's content.
    async fn get_object(&self, container: &str, key: &str) -> ClientResult<Bytes>;

    /// Write an object, replacing any existing content.
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        content: Bytes,
        options: &PutOptions,
    ) -> ClientResult<()>;

    /// Delete an object.
    async fn delete_object(&self, container: &str, key: &str) -> ClientResult<()>;

    /// List objects whose key starts with `prefix`, up to `max_keys` entries.
    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
        max_keys: Option<usize>,
    ) -> ClientResult<Vec<ObjectSummary>>;

    /// Fetch an object's metadata without its content.
    async fn stat_object(&self, container: &str, key: &str) -> ClientResult<ObjectStat>;

    /// Best-effort existence probe for an object.
    async fn object_exists(&self, container: &str, key: &str) -> ClientResult<bool>;

    /// Best-effort existence probe for a container.
    async fn container_exists(&self, container: &str) -> ClientResult<bool>;

    /// Create a container. Returns `false` when the backend reports an
    /// empty creation result; creating an already-owned container is
    /// treated as success.
    async fn create_container(&self, container: &str, access: AccessPolicy) -> ClientResult<bool>;
}

/// Create a client from configuration.
///
/// This is the recommended factory for creating backend clients; it supports
/// all available client types through a unified interface.
///
/// # Example
///
/// ```rust,ignore
/// use omnistore_core::client::{create_client, ClientConfig};
///
/// let config = ClientConfig::Memory;
/// let client = create_client(&config).await?;
/// ```
pub async fn create_client(config: &ClientConfig) -> Result<Arc<dyn ObjectClient>> {
    match config {
        ClientConfig::S3 {
            region,
            endpoint,
            access_key,
            secret_key,
            force_path_style,
        } => {
            let s3_config = S3Config {
                region: region.clone(),
                endpoint: endpoint.clone(),
                access_key_id: access_key.clone(),
                secret_access_key: secret_key.clone(),
                force_path_style: *force_path_style,
            };
            Ok(Arc::new(S3Client::connect(s3_config).await))
        }

        ClientConfig::Filesystem { path } => Ok(Arc::new(FilesystemClient::new(path.clone()))),

        ClientConfig::Memory => Ok(Arc::new(MemoryClient::new())),
    }
}
