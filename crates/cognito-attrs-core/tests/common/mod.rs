//! In-memory provider used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use cognito_attrs_core::{
    AttributeSpec, ClientAttributeUpdate, ClientGateway, GatewayError, StackDescriptor,
    StackGateway, StackOutput, UserPoolClient, UserPoolGateway, UserPoolSchema,
};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DescribeStack,
    DescribePool(String),
    AddAttributes(String, Vec<AttributeSpec>),
    DescribeClient(String, String),
    UpdateClient(ClientAttributeUpdate),
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        matches!(self, Call::AddAttributes(..) | Call::UpdateClient(_))
    }

    pub fn pool_id(&self) -> Option<&str> {
        match self {
            Call::DescribeStack => None,
            Call::DescribePool(pool) | Call::AddAttributes(pool, _) | Call::DescribeClient(pool, _) => {
                Some(pool.as_str())
            }
            Call::UpdateClient(update) => Some(update.user_pool_id.as_str()),
        }
    }
}

/// Provider state kept in memory. Writes are applied, so a second run sees
/// the result of the first.
#[derive(Default)]
pub struct FakeGateway {
    stack: Option<StackDescriptor>,
    pools: Mutex<HashMap<String, Vec<String>>>,
    clients: Mutex<HashMap<(String, String), UserPoolClient>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<&'static str, GatewayError>>,
    yield_on_calls: bool,
}

impl FakeGateway {
    pub fn new(outputs: &[(&str, &str)]) -> Self {
        Self {
            stack: Some(StackDescriptor::new(
                outputs
                    .iter()
                    .map(|(key, value)| StackOutput::new(*key, *value))
                    .collect(),
            )),
            ..Self::default()
        }
    }

    pub fn without_stack() -> Self {
        Self::default()
    }

    /// Yield to the executor inside every call so concurrent entries interleave.
    pub fn yielding(mut self) -> Self {
        self.yield_on_calls = true;
        self
    }

    pub fn with_pool(self, pool_id: &str, attributes: &[&str]) -> Self {
        self.pools.lock().unwrap().insert(
            pool_id.to_string(),
            attributes.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_client(self, pool_id: &str, client_id: &str, read: &[&str], write: &[&str]) -> Self {
        self.clients.lock().unwrap().insert(
            (pool_id.to_string(), client_id.to_string()),
            UserPoolClient {
                client_id: client_id.to_string(),
                user_pool_id: pool_id.to_string(),
                read_attributes: read.iter().map(|s| s.to_string()).collect(),
                write_attributes: write.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    /// Make the named operation fail with `error`.
    pub fn failing(self, operation: &'static str, error: GatewayError) -> Self {
        self.failures.lock().unwrap().insert(operation, error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    pub fn pool_attributes(&self, pool_id: &str) -> Vec<String> {
        self.pools.lock().unwrap().get(pool_id).cloned().unwrap_or_default()
    }

    pub fn client(&self, pool_id: &str, client_id: &str) -> Option<UserPoolClient> {
        self.clients
            .lock()
            .unwrap()
            .get(&(pool_id.to_string(), client_id.to_string()))
            .cloned()
    }

    async fn enter(&self, operation: &'static str, call: Call) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        if self.yield_on_calls {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
        }
        match self.failures.lock().unwrap().get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StackGateway for FakeGateway {
    async fn describe_stack(&self) -> Result<Option<StackDescriptor>, GatewayError> {
        self.enter("describe_stack", Call::DescribeStack).await?;
        Ok(self.stack.clone())
    }
}

#[async_trait]
impl UserPoolGateway for FakeGateway {
    async fn describe_pool(&self, user_pool_id: &str) -> Result<UserPoolSchema, GatewayError> {
        self.enter("describe_pool", Call::DescribePool(user_pool_id.to_string()))
            .await?;
        self.pools
            .lock()
            .unwrap()
            .get(user_pool_id)
            .map(|names| UserPoolSchema {
                attribute_names: names.clone(),
            })
            .ok_or_else(|| {
                GatewayError::service("ResourceNotFoundException", "User pool does not exist.")
            })
    }

    async fn add_attributes(
        &self,
        user_pool_id: &str,
        attributes: &[AttributeSpec],
    ) -> Result<(), GatewayError> {
        self.enter(
            "add_attributes",
            Call::AddAttributes(user_pool_id.to_string(), attributes.to_vec()),
        )
        .await?;
        let mut pools = self.pools.lock().unwrap();
        let names = pools.entry(user_pool_id.to_string()).or_default();
        names.extend(attributes.iter().map(AttributeSpec::normalized_name));
        Ok(())
    }
}

#[async_trait]
impl ClientGateway for FakeGateway {
    async fn describe_client(
        &self,
        user_pool_id: &str,
        client_id: &str,
    ) -> Result<UserPoolClient, GatewayError> {
        self.enter(
            "describe_client",
            Call::DescribeClient(user_pool_id.to_string(), client_id.to_string()),
        )
        .await?;
        self.client(user_pool_id, client_id).ok_or_else(|| {
            GatewayError::service("ResourceNotFoundException", "User pool client does not exist.")
        })
    }

    async fn update_client(&self, update: &ClientAttributeUpdate) -> Result<(), GatewayError> {
        self.enter("update_client", Call::UpdateClient(update.clone()))
            .await?;
        self.clients.lock().unwrap().insert(
            (update.user_pool_id.clone(), update.client_id.clone()),
            UserPoolClient {
                client_id: update.client_id.clone(),
                user_pool_id: update.user_pool_id.clone(),
                read_attributes: update.read_attributes.clone(),
                write_attributes: update.write_attributes.clone(),
            },
        );
        Ok(())
    }
}

/// A mapping object in the shape deployment configuration uses.
pub fn mapping(pool_key: &str, client_key: Option<&str>, names: &[&str]) -> Value {
    let attributes: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "AttributeDataType": "String",
                "DeveloperOnlyAttribute": false,
                "Mutable": true,
                "Name": name,
                "Required": false
            })
        })
        .collect();

    let mut value = json!({
        "CognitoUserPoolIdOutputKey": pool_key,
        "CustomAttributes": attributes,
    });
    if let Some(client_key) = client_key {
        value["CognitoUserPoolClientIdOutputKey"] = json!(client_key);
    }
    value
}
