//! Service descriptor: the deployment's name, stage and `custom` section.

use std::path::Path;

use anyhow::{Context, Result, bail};
use cognito_attrs_core::{LogSink, MappingEntry, load_from_custom};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_STAGE: &str = "dev";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDescriptor {
    pub service: Option<String>,
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub custom: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSection {
    pub stage: Option<String>,
    pub region: Option<String>,
}

impl ServiceDescriptor {
    /// Deployed stack name, `<service>-<stage>`.
    pub fn stack_name(&self) -> Option<String> {
        let service = self.service.as_deref()?;
        let stage = self.provider.stage.as_deref().unwrap_or(DEFAULT_STAGE);
        Some(format!("{service}-{stage}"))
    }

    pub fn mappings(&self, log: &dyn LogSink) -> Vec<MappingEntry> {
        load_from_custom(self.custom.as_ref(), log)
    }
}

/// Reads a JSON or TOML service descriptor, chosen by file extension.
pub fn load_service(path: &Path) -> Result<ServiceDescriptor> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read service file {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in {}", path.display())),
        Some("toml") => {
            toml::from_str(&text).with_context(|| format!("Invalid TOML in {}", path.display()))
        }
        other => bail!(
            "Unsupported service file extension {:?} (expected .json or .toml)",
            other.unwrap_or("")
        ),
    }
}
