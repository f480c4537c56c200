//! Lifecycle hooks a deployment host dispatches.
//!
//! Hosts call plugins at named points of a deployment. Unlike fire-and-forget
//! event hooks, a lifecycle hook can reject the step it is bound to, so the
//! registry awaits each hook in turn and hands the first failure back to the
//! host.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::PluginError;

/// Deployment lifecycle points hooks can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// After the stack has been deployed.
    AfterDeploy,
}

impl LifecycleEvent {
    /// The host's name for this point, e.g. `after:deploy:deploy`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AfterDeploy => "after:deploy:deploy",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for hook dispatch.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// A hook rejected the lifecycle step.
    #[error("Hook {hook} rejected {event}: {source}")]
    Rejected {
        hook: String,
        event: LifecycleEvent,
        #[source]
        source: PluginError,
    },
}

impl HookError {
    /// The plugin error behind a rejection.
    pub fn plugin_error(&self) -> &PluginError {
        match self {
            Self::Rejected { source, .. } => source,
        }
    }
}

/// A plugin callback bound to lifecycle events.
#[async_trait]
pub trait LifecycleHook: Send + Sync {
    /// Unique name for this hook (for logging).
    fn name(&self) -> &str;

    /// Events this hook handles.
    fn events(&self) -> &[LifecycleEvent];

    /// Handle a lifecycle event. An error rejects the lifecycle step.
    async fn handle(&self, event: LifecycleEvent) -> Result<(), PluginError>;

    /// Check if this hook should handle the given event.
    fn matches(&self, event: LifecycleEvent) -> bool {
        self.events().contains(&event)
    }
}

/// Registry of lifecycle hooks.
pub struct HookRegistry {
    hooks: RwLock<Vec<Arc<dyn LifecycleHook>>>,
}

impl HookRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// Register a hook.
    pub async fn register(&self, hook: Arc<dyn LifecycleHook>) {
        let name = hook.name().to_string();
        self.hooks.write().await.push(hook);
        debug!(hook = %name, "Registered lifecycle hook");
    }

    /// Get the number of registered hooks.
    pub async fn hook_count(&self) -> usize {
        self.hooks.read().await.len()
    }

    /// Run every hook bound to `event`, in registration order.
    ///
    /// Returns the number of hooks that ran. Stops at the first rejection.
    pub async fn dispatch(&self, event: LifecycleEvent) -> Result<usize, HookError> {
        let hooks: Vec<Arc<dyn LifecycleHook>> = self
            .hooks
            .read()
            .await
            .iter()
            .filter(|h| h.matches(event))
            .cloned()
            .collect();

        if hooks.is_empty() {
            debug!(event = %event, "No hooks matched event");
            return Ok(0);
        }

        for hook in &hooks {
            info!(hook = %hook.name(), event = %event, "Running lifecycle hook");
            if let Err(source) = hook.handle(event).await {
                warn!(hook = %hook.name(), event = %event, error = %source, "Lifecycle hook rejected");
                return Err(HookError::Rejected {
                    hook: hook.name().to_string(),
                    event,
                    source,
                });
            }
        }

        Ok(hooks.len())
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
