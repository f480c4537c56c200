//! Deployed stack outputs.

use serde::{Deserialize, Serialize};

use crate::error::PluginError;

/// One `OutputKey`/`OutputValue` pair of a deployed stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    pub output_key: String,
    pub output_value: String,
}

impl StackOutput {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            output_key: key.into(),
            output_value: value.into(),
        }
    }
}

/// Output directory of the deployed stack, resolved once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDescriptor {
    pub stack_name: Option<String>,
    pub outputs: Vec<StackOutput>,
}

impl StackDescriptor {
    pub fn new(outputs: Vec<StackOutput>) -> Self {
        Self {
            stack_name: None,
            outputs,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.stack_name = Some(name.into());
        self
    }

    /// Value of the output named `key`, if any.
    pub fn output(&self, key: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|output| output.output_key == key)
            .map(|output| output.output_value.as_str())
    }

    /// Value of the output named `key`, or a configuration error naming the
    /// setting (`param`) that referenced it.
    pub fn resolve(&self, param: &str, key: &str) -> Result<String, PluginError> {
        self.output(key).map(str::to_string).ok_or_else(|| {
            PluginError::configuration(format!(
                "Could not find {param} '{key}' in Outputs for stack."
            ))
        })
    }
}
