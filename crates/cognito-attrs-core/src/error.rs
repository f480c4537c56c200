//! Error types for attribute reconciliation.

use std::fmt;

/// Failure reported by a gateway implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The provider answered with an error.
    #[error("{code}: {message}")]
    Service {
        /// Provider error code, e.g. `ResourceNotFoundException`.
        code: String,
        /// Provider error message.
        message: String,
    },

    /// The request never produced a provider answer (network, credentials, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered, but the response was missing data we need.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl GatewayError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn unexpected_response(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Provider error code, if the provider answered.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// The remote call a [`PluginError::Provider`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderStage {
    DescribeStack,
    FetchUserPool,
    FetchClient,
    AddAttributes,
    UpdateClient,
}

impl ProviderStage {
    /// Human-readable label written to the host log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DescribeStack => "Error occurred when describing stack",
            Self::FetchUserPool => "Error occurred when fetching UserPool",
            Self::FetchClient => "Error occurred when fetching UserPoolClient",
            Self::AddAttributes => "Error occurred when adding attributes to pool",
            Self::UpdateClient => "Error occurred when updating client",
        }
    }

    /// Whether the failed call would have changed remote state.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::AddAttributes | Self::UpdateClient)
    }
}

impl fmt::Display for ProviderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors that abort a mapping entry or a whole run.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Required configuration is missing or malformed, or a stack output
    /// referenced by the configuration does not exist.
    #[error("{message}")]
    Configuration { message: String },

    /// A remote call failed.
    #[error("{stage}. {source}")]
    Provider {
        stage: ProviderStage,
        #[source]
        source: GatewayError,
    },
}

impl PluginError {
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn provider(stage: ProviderStage, source: GatewayError) -> Self {
        Self::Provider { stage, source }
    }

    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    #[must_use]
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    /// Stage label attached to provider errors.
    #[must_use]
    pub fn stage(&self) -> Option<ProviderStage> {
        match self {
            Self::Provider { stage, .. } => Some(*stage),
            Self::Configuration { .. } => None,
        }
    }
}

pub type PluginResult<T> = Result<T, PluginError>;
