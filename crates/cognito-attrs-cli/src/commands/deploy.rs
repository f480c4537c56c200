use std::sync::Arc;

use anyhow::Result;
use cognito_attrs_core::{
    CognitoAddCustomAttributesPlugin, HookRegistry, LifecycleEvent, TracingLogSink,
};
use tracing::info;

use super::{connect, load_target, run_options};
use crate::cli::DeployArgs;
use crate::config::Settings;
use crate::output::print_success;

/// Registers the plugin and fires `after:deploy:deploy` against the real stack.
pub async fn deploy(settings: &Settings, args: &DeployArgs) -> Result<()> {
    let target = load_target(settings, args)?;
    let gateway = connect(settings, &target).await?;
    info!(stack_name = %target.stack_name, "Running deployment hooks");

    let plugin = CognitoAddCustomAttributesPlugin::new(
        target.descriptor.custom.clone(),
        Arc::new(gateway),
        Arc::new(TracingLogSink),
    )
    .with_options(run_options(settings, args));

    let registry = HookRegistry::new();
    registry.register(Arc::new(plugin)).await;
    let ran = registry.dispatch(LifecycleEvent::AfterDeploy).await?;

    print_success(&format!(
        "{ran} hook(s) completed for {} on stack {}",
        LifecycleEvent::AfterDeploy,
        target.stack_name
    ));
    Ok(())
}
