//! Error types for the AWS gateway

use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use cognito_attrs_core::GatewayError;
use thiserror::Error;

/// Errors from building the AWS gateway
#[derive(Debug, Error)]
pub enum AwsGatewayError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing region configuration
    #[error("Missing AWS region configuration")]
    MissingRegion,
}

impl AwsGatewayError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type for AWS gateway construction
pub type Result<T> = std::result::Result<T, AwsGatewayError>;

/// Convert an SDK error into the provider-neutral gateway error.
///
/// Service errors keep their AWS error code so callers can tell, for instance,
/// a missing pool from a permissions problem. Everything else (dispatch
/// failures, timeouts, unparseable responses) becomes a transport error with
/// the full error chain as message.
pub(crate) fn gateway_error<E, R>(err: SdkError<E, R>) -> GatewayError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    if let SdkError::ServiceError(service) = &err {
        let inner = service.err();
        return GatewayError::service(
            inner.code().unwrap_or("Unknown"),
            inner.message().unwrap_or_default(),
        );
    }
    GatewayError::transport(DisplayErrorContext(&err).to_string())
}
