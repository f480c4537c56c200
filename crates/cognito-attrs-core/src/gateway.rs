//! Remote collaborators the reconciliation depends on.
//!
//! The processor never talks to a provider directly; it goes through these
//! traits so the diff logic can be exercised against in-memory fakes and so
//! cross-cutting wrappers (such as [`DryRunGateway`](crate::DryRunGateway))
//! can be stacked around a real implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::attribute::AttributeSpec;
use crate::error::GatewayError;
use crate::stack::StackDescriptor;

/// Attribute names currently defined on a user pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoolSchema {
    pub attribute_names: Vec<String>,
}

/// An app client together with the attributes it may read and write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoolClient {
    pub client_id: String,
    pub user_pool_id: String,
    pub read_attributes: Vec<String>,
    pub write_attributes: Vec<String>,
}

/// Parameters of an update-client call. The lists replace the client's
/// current lists, so callers pass the existing names plus the new ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAttributeUpdate {
    pub client_id: String,
    pub user_pool_id: String,
    pub read_attributes: Vec<String>,
    pub write_attributes: Vec<String>,
}

/// Looks up the deployed stack for the current deployment.
#[async_trait]
pub trait StackGateway: Send + Sync {
    /// Returns the stack's outputs, or `None` if no such stack is deployed.
    async fn describe_stack(&self) -> Result<Option<StackDescriptor>, GatewayError>;
}

/// User-pool schema operations.
#[async_trait]
pub trait UserPoolGateway: Send + Sync {
    async fn describe_pool(&self, user_pool_id: &str) -> Result<UserPoolSchema, GatewayError>;

    /// Adds custom attributes to the pool. Never called with an empty list.
    async fn add_attributes(
        &self,
        user_pool_id: &str,
        attributes: &[AttributeSpec],
    ) -> Result<(), GatewayError>;
}

/// App-client permission operations.
#[async_trait]
pub trait ClientGateway: Send + Sync {
    async fn describe_client(
        &self,
        user_pool_id: &str,
        client_id: &str,
    ) -> Result<UserPoolClient, GatewayError>;

    /// Replaces the client's read/write lists. Every other client setting
    /// must come out of the call unchanged.
    async fn update_client(&self, update: &ClientAttributeUpdate) -> Result<(), GatewayError>;
}

/// Everything a run needs from the provider.
pub trait ProviderGateway: StackGateway + UserPoolGateway + ClientGateway {}

impl<T> ProviderGateway for T where T: StackGateway + UserPoolGateway + ClientGateway {}

/// Shared handle to a provider gateway.
pub type DynGateway = Arc<dyn ProviderGateway>;
