//! Adapter construction configuration.

use serde::{Deserialize, Serialize};

/// Access policy applied to newly created containers and written objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessPolicy {
    /// Objects and containers are private (the default).
    #[default]
    Private,
    /// Objects and containers are publicly readable.
    Public,
}

/// Configuration consumed by [`StorageAdapter`](crate::StorageAdapter) at
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Create the backing container on first use if it does not exist.
    pub create_container_if_missing: bool,

    /// Prefix prepended to every key before it reaches the backend, and
    /// stripped from keys on the way back for listings.
    pub path_prefix: String,

    /// Locally detect a content type from content bytes when the caller did
    /// not set one. Disabled by default; detection is the only local
    /// content-sniffing computation in the system.
    pub detect_content_type: bool,

    /// Access policy for newly created containers.
    pub default_access_policy: AccessPolicy,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            create_container_if_missing: false,
            path_prefix: String::new(),
            detect_content_type: false,
            default_access_policy: AccessPolicy::Private,
        }
    }
}
