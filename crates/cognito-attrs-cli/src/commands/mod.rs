pub mod deploy;
pub mod plan;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use cognito_attrs_aws::AwsGateway;
use cognito_attrs_core::RunOptions;

use crate::cli::{DeployArgs, ServiceArgs};
use crate::config::Settings;
use crate::service::{ServiceDescriptor, load_service};

/// `--service` first, then `deploy.service_file`.
pub fn service_path(args: &ServiceArgs, settings: &Settings) -> Result<PathBuf> {
    match args.service.as_ref().or(settings.deploy.service_file.as_ref()) {
        Some(path) => Ok(path.clone()),
        None => bail!("No service descriptor given. Pass --service or set deploy.service_file"),
    }
}

/// `--stack` first, then `deploy.stack_name`, then `<service>-<stage>`.
pub fn resolve_stack_name(
    flag: Option<&str>,
    settings: &Settings,
    descriptor: &ServiceDescriptor,
) -> Result<String> {
    if let Some(name) = flag.or(settings.deploy.stack_name.as_deref()) {
        return Ok(name.to_string());
    }
    descriptor
        .stack_name()
        .context("Cannot derive a stack name: the service descriptor has no `service` name")
}

pub fn run_options(settings: &Settings, args: &DeployArgs) -> RunOptions {
    let options = settings.run;
    if args.parallel {
        options.parallel(true)
    } else {
        options
    }
}

pub(crate) struct Target {
    pub descriptor: ServiceDescriptor,
    pub stack_name: String,
}

pub(crate) fn load_target(settings: &Settings, args: &DeployArgs) -> Result<Target> {
    let descriptor = load_service(&service_path(&args.service, settings)?)?;
    let stack_name = resolve_stack_name(args.stack.as_deref(), settings, &descriptor)?;
    Ok(Target {
        descriptor,
        stack_name,
    })
}

pub(crate) async fn connect(settings: &Settings, target: &Target) -> Result<AwsGateway> {
    let config = settings.gateway_config(
        target.stack_name.clone(),
        target.descriptor.provider.region.as_deref(),
    );
    AwsGateway::from_env(config)
        .await
        .context("Failed to configure AWS clients")
}
