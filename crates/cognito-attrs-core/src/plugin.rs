//! The plugin as seen by a deployment host.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PluginError;
use crate::gateway::DynGateway;
use crate::hooks::{LifecycleEvent, LifecycleHook};
use crate::log::{LogSink, PLUGIN_NAME};
use crate::mapping::CONFIG_KEY;
use crate::orchestrator::{RunOptions, RunSummary, run};

/// Reconciles custom attributes after every deploy.
///
/// Built from a service's `custom` section; the host registers it with a
/// [`HookRegistry`](crate::HookRegistry) and dispatches
/// [`LifecycleEvent::AfterDeploy`] once the stack is up.
pub struct CognitoAddCustomAttributesPlugin {
    custom: Option<Value>,
    gateway: DynGateway,
    log: Arc<dyn LogSink>,
    options: RunOptions,
}

impl CognitoAddCustomAttributesPlugin {
    pub fn new(custom: Option<Value>, gateway: DynGateway, log: Arc<dyn LogSink>) -> Self {
        Self {
            custom,
            gateway,
            log,
            options: RunOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the reconciliation directly, outside of any hook dispatch.
    pub async fn post_deploy(&self) -> Result<RunSummary, PluginError> {
        let null = Value::Null;
        let raw = self
            .custom
            .as_ref()
            .and_then(|custom| custom.get(CONFIG_KEY))
            .unwrap_or(&null);
        run(self.gateway.as_ref(), raw, self.log.as_ref(), self.options).await
    }
}

impl std::fmt::Debug for CognitoAddCustomAttributesPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CognitoAddCustomAttributesPlugin")
            .field("configured", &self.custom.is_some())
            .field("options", &self.options)
            .finish()
    }
}

#[async_trait]
impl LifecycleHook for CognitoAddCustomAttributesPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn events(&self) -> &[LifecycleEvent] {
        &[LifecycleEvent::AfterDeploy]
    }

    async fn handle(&self, event: LifecycleEvent) -> Result<(), PluginError> {
        match event {
            LifecycleEvent::AfterDeploy => self.post_deploy().await.map(|_| ()),
        }
    }
}
