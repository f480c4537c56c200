use std::path::PathBuf;

use cognito_attrs_aws::AwsGatewayConfig;
use cognito_attrs_core::RunOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub aws: AwsSettings,
    pub deploy: DeploySettings,
    pub run: RunOptions,
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.run.max_concurrency == 0 {
            return Err("run.max_concurrency must be at least 1".into());
        }
        if self.aws.timeout_ms == Some(0) {
            return Err("aws.timeout_ms must be > 0".into());
        }
        if let Some(stack) = &self.deploy.stack_name
            && stack.trim().is_empty()
        {
            return Err("deploy.stack_name must not be empty".into());
        }
        if self.logging.level.trim().is_empty() {
            return Err("logging.level must not be empty".into());
        }
        Ok(())
    }

    /// Gateway configuration for `stack_name`, with the service's region as
    /// fallback when none is configured here.
    pub fn gateway_config(
        &self,
        stack_name: String,
        service_region: Option<&str>,
    ) -> AwsGatewayConfig {
        AwsGatewayConfig {
            stack_name,
            region: self
                .aws
                .region
                .clone()
                .or_else(|| service_region.map(str::to_string)),
            endpoint_url: self.aws.endpoint_url.clone(),
            timeout_ms: self.aws.timeout_ms,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AwsSettings {
    pub region: Option<String>,
    /// Endpoint override for both CloudFormation and Cognito (e.g. LocalStack)
    pub endpoint_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploySettings {
    pub stack_name: Option<String>,
    pub service_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

pub mod loader {
    use super::Settings;
    use config::{Config, Environment, File};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    pub const DEFAULT_SETTINGS_FILE: &str = "cognito-attrs.toml";
    pub const ENV_PREFIX: &str = "COGNITO_ATTRS";

    /// Loads settings from `path` (or `cognito-attrs.toml` when present),
    /// overridden by `COGNITO_ATTRS__SECTION__KEY` environment variables.
    pub fn load_settings(path: Option<&Path>) -> Result<Settings, String> {
        load_settings_with_env(path, None)
    }

    /// Like [`load_settings`], reading overrides from `env` instead of the
    /// process environment when given.
    pub fn load_settings_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Settings, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(format!("settings file not found: {}", p.display()));
                }
                builder = builder.add_source(File::from(p.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // e.g. COGNITO_ATTRS__RUN__PARALLEL=true
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__")
                .source(env.map(|vars| vars.into_iter().collect())),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let settings: Settings = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        settings.validate()?;
        Ok(settings)
    }
}
