//! Error types for the omnistore core library.

use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed backend-native cause carried by `StorageFailure` for diagnostics.
pub type BackendCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Adapter operation names, attached to every operation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Exists,
    Delete,
    Rename,
    Keys,
    ListKeys,
    Mtime,
    Size,
    Checksum,
    MimeType,
    Metadata,
    IsDirectory,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Exists => "exists",
            Operation::Delete => "delete",
            Operation::Rename => "rename",
            Operation::Keys => "keys",
            Operation::ListKeys => "list_keys",
            Operation::Mtime => "mtime",
            Operation::Size => "size",
            Operation::Checksum => "checksum",
            Operation::MimeType => "mime_type",
            Operation::Metadata => "metadata",
            Operation::IsDirectory => "is_directory",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical error taxonomy for adapter operations.
///
/// Every fallible adapter operation surfaces exactly one of these kinds;
/// backend-native errors never cross the adapter boundary unwrapped.
#[derive(Error, Debug)]
pub enum Error {
    /// The operation referenced a key that does not exist.
    #[error("{operation}: object not found: {key}")]
    NotFound { operation: Operation, key: String },

    /// The operation would clobber an existing object where clobbering is
    /// forbidden (e.g. rename into an existing target).
    #[error("{operation}: target already exists: {key}")]
    AlreadyExists { operation: Operation, key: String },

    /// The container does not exist and creation is disabled, or resolving
    /// or creating it failed.
    #[error("container \"{container}\" unavailable: {reason}")]
    ContainerUnavailable { container: String, reason: String },

    /// Catch-all for any backend-raised condition not otherwise classified.
    #[error("{} failed (key: {}): {source}", .operation, .key.as_deref().unwrap_or("<none>"))]
    StorageFailure {
        operation: Operation,
        key: Option<String>,
        #[source]
        source: BackendCause,
    },

    /// Configuration error (URL parsing, client construction).
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a `NotFound` error for the given operation and key.
    pub fn not_found(operation: Operation, key: impl Into<String>) -> Self {
        Error::NotFound {
            operation,
            key: key.into(),
        }
    }

    /// Build an `AlreadyExists` error for the given operation and key.
    pub fn already_exists(operation: Operation, key: impl Into<String>) -> Self {
        Error::AlreadyExists {
            operation,
            key: key.into(),
        }
    }

    /// Build a `ContainerUnavailable` error for the given container.
    pub fn container_unavailable(container: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ContainerUnavailable {
            container: container.into(),
            reason: reason.into(),
        }
    }

    /// Build a `StorageFailure` wrapping the backend cause.
    pub fn storage_failure(
        operation: Operation,
        key: Option<&str>,
        source: impl Into<BackendCause>,
    ) -> Self {
        Error::StorageFailure {
            operation,
            key: key.map(str::to_string),
            source: source.into(),
        }
    }
}
