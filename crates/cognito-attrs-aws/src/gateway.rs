//! CloudFormation + Cognito implementation of the provider gateway.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_cloudformation::operation::describe_stacks::DescribeStacksError;
use aws_sdk_cognitoidentityprovider::operation::update_user_pool_client::builders::UpdateUserPoolClientFluentBuilder;
use aws_sdk_cognitoidentityprovider::types::{
    AttributeDataType as SdkAttributeDataType, NumberAttributeConstraintsType,
    SchemaAttributeType, StringAttributeConstraintsType, UserPoolClientType,
};
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use aws_smithy_types::retry::RetryConfig;
use aws_smithy_types::timeout::TimeoutConfig;
use cognito_attrs_core::{
    AttributeSpec, CUSTOM_ATTRIBUTE_PREFIX, ClientAttributeUpdate, ClientGateway, GatewayError,
    StackDescriptor, StackGateway, StackOutput, UserPoolClient, UserPoolGateway, UserPoolSchema,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AwsGatewayError, Result, gateway_error};

/// AWS gateway configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsGatewayConfig {
    /// CloudFormation stack whose outputs hold the pool and client ids
    pub stack_name: String,
    /// AWS region (optional, uses SDK default if not specified)
    #[serde(default)]
    pub region: Option<String>,
    /// Optional endpoint override (e.g. LocalStack)
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Operation timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Provider gateway backed by the AWS SDK.
///
/// SDK retries are disabled: every gateway method is exactly one request, and
/// a failure surfaces immediately.
#[derive(Clone)]
pub struct AwsGateway {
    cloudformation: aws_sdk_cloudformation::Client,
    cognito: aws_sdk_cognitoidentityprovider::Client,
    stack_name: String,
}

impl std::fmt::Debug for AwsGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsGateway")
            .field("stack_name", &self.stack_name)
            .finish()
    }
}

impl AwsGateway {
    /// Create a gateway from a loaded SDK configuration.
    ///
    /// Both clients inherit the `SdkConfig` (credentials, HTTP client, sleep
    /// impl) and then get the region, endpoint and timeout overrides.
    pub fn new(sdk_config: &aws_config::SdkConfig, config: AwsGatewayConfig) -> Result<Self> {
        if config.stack_name.trim().is_empty() {
            return Err(AwsGatewayError::invalid_config("stack name must not be empty"));
        }
        if config.region.is_none() && sdk_config.region().is_none() {
            return Err(AwsGatewayError::MissingRegion);
        }

        let timeout_config = config.timeout_ms.map(|ms| {
            TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(ms))
                .build()
        });

        let mut cfn = aws_sdk_cloudformation::config::Builder::from(sdk_config)
            .retry_config(RetryConfig::disabled());
        let mut cognito = aws_sdk_cognitoidentityprovider::config::Builder::from(sdk_config)
            .retry_config(RetryConfig::disabled());

        if let Some(region) = &config.region {
            cfn = cfn.region(aws_sdk_cloudformation::config::Region::new(region.clone()));
            cognito = cognito.region(aws_sdk_cognitoidentityprovider::config::Region::new(
                region.clone(),
            ));
        }

        if let Some(endpoint) = &config.endpoint_url {
            cfn = cfn.endpoint_url(endpoint);
            cognito = cognito.endpoint_url(endpoint);
        }

        if let Some(timeout_config) = timeout_config {
            cfn = cfn.timeout_config(timeout_config.clone());
            cognito = cognito.timeout_config(timeout_config);
        }

        Ok(Self {
            cloudformation: aws_sdk_cloudformation::Client::from_conf(cfn.build()),
            cognito: aws_sdk_cognitoidentityprovider::Client::from_conf(cognito.build()),
            stack_name: config.stack_name,
        })
    }

    /// Load the SDK configuration from the environment and create a gateway.
    pub async fn from_env(config: AwsGatewayConfig) -> Result<Self> {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::new(&sdk_config, config)
    }

    /// Create from pre-built clients (for testing)
    pub fn from_clients(
        cloudformation: aws_sdk_cloudformation::Client,
        cognito: aws_sdk_cognitoidentityprovider::Client,
        stack_name: impl Into<String>,
    ) -> Self {
        Self {
            cloudformation,
            cognito,
            stack_name: stack_name.into(),
        }
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }
}

/// `DescribeStacks` reports an unknown stack as a `ValidationError`.
fn is_missing_stack<R>(err: &SdkError<DescribeStacksError, R>) -> bool {
    err.as_service_error().is_some_and(|e| {
        e.code() == Some("ValidationError")
            && e.message().is_some_and(|m| m.contains("does not exist"))
    })
}

/// Cognito adds the `custom:` prefix itself, so definitions go out bare.
fn to_schema_attribute(spec: &AttributeSpec) -> SchemaAttributeType {
    let name = spec
        .name
        .strip_prefix(CUSTOM_ATTRIBUTE_PREFIX)
        .unwrap_or(&spec.name);

    SchemaAttributeType::builder()
        .name(name)
        .attribute_data_type(SdkAttributeDataType::from(spec.attribute_data_type.as_str()))
        .set_developer_only_attribute(spec.developer_only_attribute)
        .set_mutable(spec.mutable)
        .set_required(spec.required)
        .set_number_attribute_constraints(spec.number_attribute_constraints.as_ref().map(|c| {
            NumberAttributeConstraintsType::builder()
                .set_min_value(c.min_value.clone())
                .set_max_value(c.max_value.clone())
                .build()
        }))
        .set_string_attribute_constraints(spec.string_attribute_constraints.as_ref().map(|c| {
            StringAttributeConstraintsType::builder()
                .set_min_length(c.min_length.clone())
                .set_max_length(c.max_length.clone())
                .build()
        }))
        .build()
}

#[async_trait]
impl StackGateway for AwsGateway {
    async fn describe_stack(&self) -> std::result::Result<Option<StackDescriptor>, GatewayError> {
        let output = match self
            .cloudformation
            .describe_stacks()
            .stack_name(&self.stack_name)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if is_missing_stack(&err) => {
                debug!(stack_name = %self.stack_name, "Stack does not exist");
                return Ok(None);
            }
            Err(err) => return Err(gateway_error(err)),
        };

        let Some(stack) = output.stacks().first() else {
            return Ok(None);
        };

        let outputs = stack
            .outputs()
            .iter()
            .filter_map(|o| Some(StackOutput::new(o.output_key()?, o.output_value()?)))
            .collect();

        Ok(Some(
            StackDescriptor::new(outputs).with_name(stack.stack_name().unwrap_or(&self.stack_name)),
        ))
    }
}

#[async_trait]
impl UserPoolGateway for AwsGateway {
    async fn describe_pool(
        &self,
        user_pool_id: &str,
    ) -> std::result::Result<UserPoolSchema, GatewayError> {
        let output = self
            .cognito
            .describe_user_pool()
            .user_pool_id(user_pool_id)
            .send()
            .await
            .map_err(gateway_error)?;

        let pool = output.user_pool().ok_or_else(|| {
            GatewayError::unexpected_response("DescribeUserPool returned no UserPool")
        })?;

        Ok(UserPoolSchema {
            attribute_names: pool
                .schema_attributes()
                .iter()
                .filter_map(|a| a.name().map(str::to_string))
                .collect(),
        })
    }

    async fn add_attributes(
        &self,
        user_pool_id: &str,
        attributes: &[AttributeSpec],
    ) -> std::result::Result<(), GatewayError> {
        debug!(user_pool_id, count = attributes.len(), "AddCustomAttributes");
        self.cognito
            .add_custom_attributes()
            .user_pool_id(user_pool_id)
            .set_custom_attributes(Some(attributes.iter().map(to_schema_attribute).collect()))
            .send()
            .await
            .map_err(gateway_error)?;
        Ok(())
    }
}

impl AwsGateway {
    async fn fetch_client(
        &self,
        user_pool_id: &str,
        client_id: &str,
    ) -> std::result::Result<UserPoolClientType, GatewayError> {
        let output = self
            .cognito
            .describe_user_pool_client()
            .user_pool_id(user_pool_id)
            .client_id(client_id)
            .send()
            .await
            .map_err(gateway_error)?;

        output.user_pool_client.ok_or_else(|| {
            GatewayError::unexpected_response("DescribeUserPoolClient returned no UserPoolClient")
        })
    }
}

fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    (!items.is_empty()).then(|| items.to_vec())
}

/// Copies every updatable setting of `current` onto `request`.
///
/// `UpdateUserPoolClient` resets any setting the request omits to its default,
/// so an attribute grant has to restate the rest of the client unchanged.
fn preserve_settings(
    request: UpdateUserPoolClientFluentBuilder,
    current: &UserPoolClientType,
) -> UpdateUserPoolClientFluentBuilder {
    // Zero validity means "not set"; sending it back is rejected.
    let refresh_token_validity =
        Option::<i32>::from(current.refresh_token_validity()).filter(|v| *v > 0);

    request
        .set_client_name(current.client_name().map(str::to_string))
        .set_refresh_token_validity(refresh_token_validity)
        .set_access_token_validity(Option::<i32>::from(current.access_token_validity()))
        .set_id_token_validity(Option::<i32>::from(current.id_token_validity()))
        .set_token_validity_units(current.token_validity_units().cloned())
        .set_explicit_auth_flows(non_empty(current.explicit_auth_flows()))
        .set_supported_identity_providers(non_empty(current.supported_identity_providers()))
        .set_callback_urls(non_empty(current.callback_urls()))
        .set_logout_urls(non_empty(current.logout_urls()))
        .set_default_redirect_uri(current.default_redirect_uri().map(str::to_string))
        .set_allowed_o_auth_flows(non_empty(current.allowed_o_auth_flows()))
        .set_allowed_o_auth_scopes(non_empty(current.allowed_o_auth_scopes()))
        .set_allowed_o_auth_flows_user_pool_client(Option::<bool>::from(
            current.allowed_o_auth_flows_user_pool_client(),
        ))
        .set_analytics_configuration(current.analytics_configuration().cloned())
        .set_prevent_user_existence_errors(current.prevent_user_existence_errors().cloned())
        .set_enable_token_revocation(Option::<bool>::from(current.enable_token_revocation()))
        .set_enable_propagate_additional_user_context_data(Option::<bool>::from(
            current.enable_propagate_additional_user_context_data(),
        ))
        .set_auth_session_validity(Option::<i32>::from(current.auth_session_validity()))
}

#[async_trait]
impl ClientGateway for AwsGateway {
    async fn describe_client(
        &self,
        user_pool_id: &str,
        client_id: &str,
    ) -> std::result::Result<UserPoolClient, GatewayError> {
        let client = self.fetch_client(user_pool_id, client_id).await?;

        Ok(UserPoolClient {
            client_id: client.client_id().unwrap_or(client_id).to_string(),
            user_pool_id: client.user_pool_id().unwrap_or(user_pool_id).to_string(),
            read_attributes: client.read_attributes().to_vec(),
            write_attributes: client.write_attributes().to_vec(),
        })
    }

    /// Re-reads the client right before the write so that only the two
    /// attribute lists change.
    async fn update_client(
        &self,
        update: &ClientAttributeUpdate,
    ) -> std::result::Result<(), GatewayError> {
        let current = self
            .fetch_client(&update.user_pool_id, &update.client_id)
            .await?;
        debug!(
            user_pool_id = %update.user_pool_id,
            client_id = %update.client_id,
            "UpdateUserPoolClient"
        );

        let request = self
            .cognito
            .update_user_pool_client()
            .user_pool_id(&update.user_pool_id)
            .client_id(&update.client_id);
        preserve_settings(request, &current)
            .set_read_attributes(Some(update.read_attributes.clone()))
            .set_write_attributes(Some(update.write_attributes.clone()))
            .send()
            .await
            .map_err(gateway_error)?;
        Ok(())
    }
}
