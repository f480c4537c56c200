//! Gateway decorator that plans mutations instead of sending them.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::attribute::AttributeSpec;
use crate::error::GatewayError;
use crate::gateway::{
    ClientAttributeUpdate, ClientGateway, DynGateway, StackGateway, UserPoolClient, UserPoolGateway,
    UserPoolSchema,
};
use crate::stack::StackDescriptor;

/// A mutating call that a dry run held back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedChange {
    AddAttributes {
        user_pool_id: String,
        attributes: Vec<AttributeSpec>,
    },
    UpdateClient(ClientAttributeUpdate),
}

/// Wraps a gateway so that reads go through and writes are only recorded.
///
/// Because the wrapped gateway never sees the writes, a dry run reports what
/// a real run would do against the provider's current state.
pub struct DryRunGateway {
    inner: DynGateway,
    planned: Mutex<Vec<PlannedChange>>,
}

impl DryRunGateway {
    pub fn new(inner: DynGateway) -> Self {
        Self {
            inner,
            planned: Mutex::new(Vec::new()),
        }
    }

    /// Changes recorded so far, in call order.
    pub fn planned_changes(&self) -> Vec<PlannedChange> {
        self.planned
            .lock()
            .map(|planned| planned.clone())
            .unwrap_or_default()
    }

    fn record(&self, change: PlannedChange) {
        if let Ok(mut planned) = self.planned.lock() {
            planned.push(change);
        }
    }
}

impl std::fmt::Debug for DryRunGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DryRunGateway")
            .field("planned", &self.planned_changes().len())
            .finish()
    }
}

#[async_trait]
impl StackGateway for DryRunGateway {
    async fn describe_stack(&self) -> Result<Option<StackDescriptor>, GatewayError> {
        self.inner.describe_stack().await
    }
}

#[async_trait]
impl UserPoolGateway for DryRunGateway {
    async fn describe_pool(&self, user_pool_id: &str) -> Result<UserPoolSchema, GatewayError> {
        self.inner.describe_pool(user_pool_id).await
    }

    async fn add_attributes(
        &self,
        user_pool_id: &str,
        attributes: &[AttributeSpec],
    ) -> Result<(), GatewayError> {
        info!(user_pool_id, count = attributes.len(), "Dry run: skipping AddCustomAttributes");
        self.record(PlannedChange::AddAttributes {
            user_pool_id: user_pool_id.to_string(),
            attributes: attributes.to_vec(),
        });
        Ok(())
    }
}

#[async_trait]
impl ClientGateway for DryRunGateway {
    async fn describe_client(
        &self,
        user_pool_id: &str,
        client_id: &str,
    ) -> Result<UserPoolClient, GatewayError> {
        self.inner.describe_client(user_pool_id, client_id).await
    }

    async fn update_client(&self, update: &ClientAttributeUpdate) -> Result<(), GatewayError> {
        info!(
            user_pool_id = %update.user_pool_id,
            client_id = %update.client_id,
            "Dry run: skipping UpdateUserPoolClient"
        );
        self.record(PlannedChange::UpdateClient(update.clone()));
        Ok(())
    }
}
