use anyhow::{Result, bail};
use cognito_attrs_core::TracingLogSink;

use super::{resolve_stack_name, service_path};
use crate::cli::{OutputFormat, ServiceArgs};
use crate::config::Settings;
use crate::output::{print_entries, print_success};
use crate::service::{ServiceDescriptor, load_service};

/// Loads the mapping entries offline; dropped entries are logged as they would be on deploy.
pub fn validate(settings: &Settings, args: &ServiceArgs, format: OutputFormat) -> Result<()> {
    let descriptor = load_service(&service_path(args, settings)?)?;
    let entries = descriptor.mappings(&TracingLogSink);
    if entries.is_empty() {
        bail!("Missing required fields.");
    }

    print_entries(&entries, format)?;
    if format == OutputFormat::Table {
        print_success(&format!(
            "{} mapping entr{} valid for stack {}",
            entries.len(),
            if entries.len() == 1 { "y" } else { "ies" },
            target_stack(settings, &descriptor)
        ));
    }
    Ok(())
}

/// The stack a deploy without `--stack` would target.
fn target_stack(settings: &Settings, descriptor: &ServiceDescriptor) -> String {
    resolve_stack_name(None, settings, descriptor).unwrap_or_else(|_| "(unknown)".into())
}
