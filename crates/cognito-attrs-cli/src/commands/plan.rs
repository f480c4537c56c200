use std::sync::Arc;

use anyhow::Result;
use cognito_attrs_core::{CognitoAddCustomAttributesPlugin, DryRunGateway, TracingLogSink};

use super::{connect, load_target, run_options};
use crate::cli::{DeployArgs, OutputFormat};
use crate::config::Settings;
use crate::output::{print_plan, print_summary};

/// Runs the hook through the dry-run gateway and prints what it would change.
pub async fn plan(settings: &Settings, args: &DeployArgs, format: OutputFormat) -> Result<()> {
    let target = load_target(settings, args)?;
    let gateway = connect(settings, &target).await?;
    let dry_run = Arc::new(DryRunGateway::new(Arc::new(gateway)));

    let plugin = CognitoAddCustomAttributesPlugin::new(
        target.descriptor.custom.clone(),
        dry_run.clone(),
        Arc::new(TracingLogSink),
    )
    .with_options(run_options(settings, args));

    let summary = plugin.post_deploy().await?;

    print_plan(&dry_run.planned_changes(), format)?;
    if format == OutputFormat::Table {
        print_summary(&summary, format)?;
    }
    Ok(())
}
