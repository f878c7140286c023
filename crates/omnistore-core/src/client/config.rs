//! Client configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;

/// Client configuration using a tagged enum for type-safe configuration.
///
/// Supports the available backend clients:
/// - S3 and S3-compatible (MinIO, Ceph RGW, Aliyun OSS, etc.)
/// - Local filesystem
/// - In-memory (for testing)
///
/// The container/bucket name is deliberately not part of the client
/// configuration: one client may serve several adapters, and each adapter
/// owns exactly one container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend")]
pub enum ClientConfig {
    /// AWS S3 or S3-compatible storage.
    #[serde(rename = "s3")]
    S3 {
        /// AWS region (e.g., "us-east-1")
        #[serde(default)]
        region: Option<String>,
        /// Custom endpoint URL (for MinIO, Ceph RGW, Aliyun OSS)
        #[serde(default)]
        endpoint: Option<String>,
        /// Access key ID (falls back to the ambient credential chain)
        #[serde(default)]
        access_key: Option<String>,
        /// Secret access key (falls back to the ambient credential chain)
        #[serde(default)]
        secret_key: Option<String>,
        /// Use path-style requests (required for MinIO/Ceph RGW)
        #[serde(default)]
        force_path_style: bool,
    },

    /// Local filesystem storage; containers are directories under `path`.
    #[serde(rename = "filesystem")]
    Filesystem {
        /// Base path under which containers live
        path: PathBuf,
    },

    /// In-memory storage (for testing)
    #[serde(rename = "memory")]
    Memory,
}

impl ClientConfig {
    /// Parse a storage URL into a client configuration and a container name.
    ///
    /// Supported URL formats:
    /// - `s3://container-name?region=us-east-1&endpoint=http://localhost:9000&path_style=true`
    /// - `file:///base/path/container-name`
    /// - `memory://container-name`
    pub fn from_url(url: &str) -> crate::Result<(Self, String)> {
        let parsed = url::Url::parse(url)
            .map_err(|e| Error::Config(format!("Invalid storage URL: {}", e)))?;

        match parsed.scheme() {
            "s3" | "s3a" | "oss" => {
                let container = parsed.host_str().unwrap_or_default().to_string();
                if container.is_empty() {
                    return Err(Error::Config("S3 URL must name a bucket".to_string()));
                }
                let region = parsed
                    .query_pairs()
                    .find(|(k, _)| k == "region")
                    .map(|(_, v)| v.to_string());
                let endpoint = parsed
                    .query_pairs()
                    .find(|(k, _)| k == "endpoint")
                    .map(|(_, v)| v.to_string());
                let force_path_style = parsed
                    .query_pairs()
                    .find(|(k, _)| k == "path_style")
                    .map(|(_, v)| v == "true")
                    .unwrap_or(false);

                Ok((
                    Self::S3 {
                        region,
                        endpoint,
                        access_key: std::env::var("AWS_ACCESS_KEY_ID").ok(),
                        secret_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
                        force_path_style,
                    },
                    container,
                ))
            }
            "file" => {
                let full = PathBuf::from(parsed.path());
                let container = full
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        Error::Config("file URL must end in a container directory".to_string())
                    })?;
                let path = full
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/"));
                Ok((Self::Filesystem { path }, container))
            }
            "memory" => {
                let container = parsed.host_str().unwrap_or_default().to_string();
                if container.is_empty() {
                    return Err(Error::Config("memory URL must name a container".to_string()));
                }
                Ok((Self::Memory, container))
            }
            scheme => Err(Error::Config(format!("Unknown storage scheme: {}", scheme))),
        }
    }
}
