//! Filesystem client implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{ClientError, ClientResult, ObjectClient, ObjectStat, ObjectSummary, PutOptions};
use crate::config::AccessPolicy;

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Filesystem-based client.
///
/// Containers are directories under the base path; objects are files below
/// them. Access policies and user metadata have no filesystem mapping and
/// are ignored on write.
#[derive(Debug, Clone)]
pub struct FilesystemClient {
    base_path: PathBuf,
}

impl FilesystemClient {
    /// Create a new filesystem client with the given base path.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn container_path(&self, container: &str) -> PathBuf {
        self.base_path.join(container)
    }

    /// Convert a storage key to a filesystem path.
    fn key_to_path(&self, container: &str, key: &str) -> PathBuf {
        // Normalize key to prevent path traversal
        let normalized = key.trim_start_matches('/');
        self.container_path(container).join(normalized)
    }

    /// Convert a filesystem path back to a storage key.
    fn path_to_key(&self, container: &str, path: &Path) -> Option<String> {
        path.strip_prefix(self.container_path(container))
            .ok()
            .map(|p| p.to_string_lossy().to_string())
    }

    fn map_io(err: std::io::Error, context: String) -> ClientError {
        if err.kind() == std::io::ErrorKind::NotFound {
            ClientError::NotFound
        } else {
            ClientError::backend(format!("{}: {}", context, err))
        }
    }

    fn http_date(modified: std::time::SystemTime) -> String {
        DateTime::<Utc>::from(modified).format(HTTP_DATE).to_string()
    }
}

#[async_trait::async_trait]
impl ObjectClient for FilesystemClient {
    async fn get_object(&self, container: &str, key: &str) -> ClientResult<Bytes> {
        let path = self.key_to_path(container, key);

        let mut file = fs::File::open(&path)
            .await
            .map_err(|e| Self::map_io(e, format!("Failed to open file {}", path.display())))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data).await.map_err(|e| {
            ClientError::backend(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(Bytes::from(data))
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        content: Bytes,
        _options: &PutOptions,
    ) -> ClientResult<()> {
        let path = self.key_to_path(container, key);

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ClientError::backend(format!("Failed to create directories: {}", e))
            })?;
        }

        let mut file = fs::File::create(&path).await.map_err(|e| {
            ClientError::backend(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&content).await.map_err(|e| {
            ClientError::backend(format!("Failed to write to file {}: {}", path.display(), e))
        })?;

        file.flush().await.map_err(|e| {
            ClientError::backend(format!("Failed to flush file {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    async fn delete_object(&self, container: &str, key: &str) -> ClientResult<()> {
        let path = self.key_to_path(container, key);

        fs::remove_file(&path)
            .await
            .map_err(|e| Self::map_io(e, format!("Failed to delete file {}", path.display())))?;

        Ok(())
    }

    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
        max_keys: Option<usize>,
    ) -> ClientResult<Vec<ObjectSummary>> {
        let root = self.container_path(container);
        let mut results = Vec::new();

        // A missing container directory lists as empty rather than failing;
        // the container lifecycle owns existence checks.
        if fs::metadata(&root).await.is_err() {
            return Ok(results);
        }

        // Walk the directory tree
        let mut stack = vec![root];
        while let Some(dir) = stack.pop() {
            let mut entries = fs::read_dir(&dir).await.map_err(|e| {
                ClientError::backend(format!(
                    "Failed to read directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;

            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                ClientError::backend(format!("Failed to read directory entry: {}", e))
            })? {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                    continue;
                }

                let Some(key) = self.path_to_key(container, &path) else {
                    continue;
                };
                // Prefixes are plain string prefixes on keys, not directory
                // components, so filter after flattening.
                if !key.starts_with(prefix) {
                    continue;
                }

                let metadata = entry.metadata().await.map_err(|e| {
                    ClientError::backend(format!(
                        "Failed to get metadata for {}: {}",
                        path.display(),
                        e
                    ))
                })?;

                results.push(ObjectSummary {
                    key,
                    last_modified: metadata.modified().ok().map(Self::http_date),
                    size: metadata.len(),
                    etag: None,
                    content_type: None,
                });
            }
        }

        results.sort_by(|a, b| a.key.cmp(&b.key));
        if let Some(max) = max_keys {
            results.truncate(max);
        }
        Ok(results)
    }

    async fn stat_object(&self, container: &str, key: &str) -> ClientResult<ObjectStat> {
        let path = self.key_to_path(container, key);

        let metadata = fs::metadata(&path).await.map_err(|e| {
            Self::map_io(e, format!("Failed to get metadata for {}", path.display()))
        })?;

        if metadata.is_dir() {
            return Err(ClientError::NotFound);
        }

        Ok(ObjectStat {
            size: metadata.len(),
            last_modified: metadata.modified().ok().map(Self::http_date),
            etag: None,
            content_type: None,
            metadata: HashMap::new(),
        })
    }

    async fn object_exists(&self, container: &str, key: &str) -> ClientResult<bool> {
        let path = self.key_to_path(container, key);
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ClientError::backend(format!(
                "Failed to probe {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn container_exists(&self, container: &str) -> ClientResult<bool> {
        let path = self.container_path(container);
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ClientError::backend(format!(
                "Failed to probe {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn create_container(&self, container: &str, _access: AccessPolicy) -> ClientResult<bool> {
        let path = self.container_path(container);
        fs::create_dir_all(&path).await.map_err(|e| {
            ClientError::backend(format!(
                "Failed to create container directory {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(true)
    }
}
