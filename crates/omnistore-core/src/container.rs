//! Container lifecycle management.
//!
//! A container is resolved at most once per adapter instance. The lifecycle
//! is an explicit state machine rather than a nullable field: `Unresolved`
//! transitions through a resolving phase (the held lock) into either
//! `Resolved`, which memoizes the handle for the adapter's lifetime, or
//! `Failed`, which is terminal — the memoized failure is re-raised on every
//! subsequent call until the adapter is reconstructed. There is no
//! retry-on-next-call, and a resolved handle is never re-checked even if the
//! backend container is deleted externally.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::client::{ClientError, ObjectClient};
use crate::config::AccessPolicy;
use crate::error::Error;
use crate::Result;

/// Resolved handle to a backend container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    name: String,
}

impl ContainerHandle {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// The container's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
enum ContainerState {
    Unresolved,
    Resolved(ContainerHandle),
    Failed(String),
}

/// Lazily resolves or creates the backing container, exactly once.
pub struct ContainerLifecycle {
    name: String,
    create_if_missing: bool,
    access: AccessPolicy,
    state: Mutex<ContainerState>,
}

impl ContainerLifecycle {
    /// Create a lifecycle for the named container.
    pub fn new(name: impl Into<String>, create_if_missing: bool, access: AccessPolicy) -> Self {
        Self {
            name: name.into(),
            create_if_missing,
            access,
            state: Mutex::new(ContainerState::Unresolved),
        }
    }

    /// The container's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the container, creating it on first access if configured.
    ///
    /// Concurrent first-use callers serialize on the state lock, so at most
    /// one resolve-or-create transition runs.
    pub async fn resolve(&self, client: &dyn ObjectClient) -> Result<ContainerHandle> {
        let mut state = self.state.lock().await;

        match &*state {
            ContainerState::Resolved(handle) => return Ok(handle.clone()),
            ContainerState::Failed(reason) => {
                return Err(Error::container_unavailable(&self.name, reason.clone()))
            }
            ContainerState::Unresolved => {}
        }

        match self.resolve_or_create(client).await {
            Ok(handle) => {
                debug!("Resolved container: {}", self.name);
                *state = ContainerState::Resolved(handle.clone());
                Ok(handle)
            }
            Err(reason) => {
                warn!("Container \"{}\" unavailable: {}", self.name, reason);
                *state = ContainerState::Failed(reason.clone());
                Err(Error::container_unavailable(&self.name, reason))
            }
        }
    }

    async fn resolve_or_create(
        &self,
        client: &dyn ObjectClient,
    ) -> std::result::Result<ContainerHandle, String> {
        match client.container_exists(&self.name).await {
            Ok(true) => return Ok(ContainerHandle::new(&self.name)),
            // A client signaling absence through its not-found form is
            // normalized to the same branch as a false probe.
            Ok(false) | Err(ClientError::NotFound) => {}
            Err(ClientError::Backend(cause)) => {
                return Err(format!("existence check failed: {}", cause));
            }
        }

        if !self.create_if_missing {
            return Err("container does not exist and creation is disabled".to_string());
        }

        match client.create_container(&self.name, self.access).await {
            Ok(true) => {
                info!("Created container: {}", self.name);
                Ok(ContainerHandle::new(&self.name))
            }
            Ok(false) => Err("backend reported an empty creation result".to_string()),
            Err(e) => Err(format!("creation failed: {}", e)),
        }
    }
}
