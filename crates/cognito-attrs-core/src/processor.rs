//! Reconciliation of a single mapping entry.

use serde::Serialize;
use tracing::debug;

use crate::attribute::AttributeSpec;
use crate::error::{PluginError, ProviderStage};
use crate::gateway::{ClientAttributeUpdate, ProviderGateway};
use crate::log::LogSink;
use crate::mapping::{MappingEntry, params};
use crate::resolver::{missing_attributes, normalized_names};
use crate::stack::StackDescriptor;

/// What reconciling one mapping entry changed.
///
/// Empty lists mean the corresponding call was not issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryOutcome {
    pub user_pool_id: String,
    /// Normalized names of the attributes added to the pool.
    pub added_attributes: Vec<String>,
    pub client_id: Option<String>,
    /// Normalized names newly granted for reading.
    pub granted_read: Vec<String>,
    /// Normalized names newly granted for writing.
    pub granted_write: Vec<String>,
}

impl EntryOutcome {
    /// Whether any mutating call was issued.
    pub fn changed(&self) -> bool {
        !self.added_attributes.is_empty()
            || !self.granted_read.is_empty()
            || !self.granted_write.is_empty()
    }
}

/// Brings one user pool (and optionally one app client) up to the entry's
/// desired attributes.
///
/// The pool is handled first: its schema is fetched, the missing attributes are
/// added in one call. Then, if the entry names a client, its read and write
/// lists are extended with every desired attribute they lack, again in one
/// call. Nothing is retried; the first failing call ends the entry.
pub async fn process_mapping(
    gateway: &dyn ProviderGateway,
    stack: &StackDescriptor,
    entry: &MappingEntry,
    log: &dyn LogSink,
) -> Result<EntryOutcome, PluginError> {
    let user_pool_id = stack.resolve(params::USER_POOL_OUTPUT_KEY, &entry.user_pool_output_key)?;
    log.log(&format!("Found userPoolId: {user_pool_id}"));

    let added_attributes =
        reconcile_pool(gateway, &user_pool_id, &entry.custom_attributes, log).await?;

    let mut outcome = EntryOutcome {
        user_pool_id,
        added_attributes,
        ..EntryOutcome::default()
    };

    let Some(client_key) = entry.client_output_key.as_deref() else {
        log.log(&format!(
            "No {} configured, client permissions will not be updated",
            params::CLIENT_OUTPUT_KEY
        ));
        return Ok(outcome);
    };

    let client_id = stack.resolve(params::CLIENT_OUTPUT_KEY, client_key)?;
    log.log(&format!("Found userPoolClientId: {client_id}"));

    let (granted_read, granted_write) = reconcile_client(
        gateway,
        &outcome.user_pool_id,
        &client_id,
        &entry.custom_attributes,
        log,
    )
    .await?;

    outcome.client_id = Some(client_id);
    outcome.granted_read = granted_read;
    outcome.granted_write = granted_write;
    Ok(outcome)
}

async fn reconcile_pool(
    gateway: &dyn ProviderGateway,
    user_pool_id: &str,
    desired: &[AttributeSpec],
    log: &dyn LogSink,
) -> Result<Vec<String>, PluginError> {
    let schema = gateway
        .describe_pool(user_pool_id)
        .await
        .map_err(|e| PluginError::provider(ProviderStage::FetchUserPool, e))?;

    let missing = missing_attributes(desired, &schema.attribute_names);
    debug!(
        user_pool_id,
        existing = schema.attribute_names.len(),
        missing = missing.len(),
        "Compared pool schema"
    );

    if missing.is_empty() {
        log.log("Supplied attributes already exist in pool");
        return Ok(Vec::new());
    }

    let names: Vec<&str> = missing.iter().map(|a| a.name.as_str()).collect();
    log.log(&format!(
        "Adding {} attribute(s) to pool: {}",
        missing.len(),
        names.join(",")
    ));

    gateway
        .add_attributes(user_pool_id, &missing)
        .await
        .map_err(|e| PluginError::provider(ProviderStage::AddAttributes, e))?;
    log.log("Successfully added attributes to pool");

    Ok(normalized_names(&missing))
}

async fn reconcile_client(
    gateway: &dyn ProviderGateway,
    user_pool_id: &str,
    client_id: &str,
    desired: &[AttributeSpec],
    log: &dyn LogSink,
) -> Result<(Vec<String>, Vec<String>), PluginError> {
    let client = gateway
        .describe_client(user_pool_id, client_id)
        .await
        .map_err(|e| PluginError::provider(ProviderStage::FetchClient, e))?;

    let new_read = normalized_names(&missing_attributes(desired, &client.read_attributes));
    let new_write = normalized_names(&missing_attributes(desired, &client.write_attributes));
    debug!(
        user_pool_id,
        client_id,
        new_read = new_read.len(),
        new_write = new_write.len(),
        "Compared client permissions"
    );

    if new_read.is_empty() && new_write.is_empty() {
        log.log("No update required to UserPoolClient");
        return Ok((Vec::new(), Vec::new()));
    }

    if !new_read.is_empty() {
        log.log(&format!(
            "Enabling client to read from {} new attribute(s): {}",
            new_read.len(),
            new_read.join(",")
        ));
    }
    if !new_write.is_empty() {
        log.log(&format!(
            "Enabling client to write to {} new attribute(s): {}",
            new_write.len(),
            new_write.join(",")
        ));
    }

    let update = ClientAttributeUpdate {
        client_id: client.client_id.clone(),
        user_pool_id: client.user_pool_id.clone(),
        read_attributes: client
            .read_attributes
            .iter()
            .chain(&new_read)
            .cloned()
            .collect(),
        write_attributes: client
            .write_attributes
            .iter()
            .chain(&new_write)
            .cloned()
            .collect(),
    };

    gateway
        .update_client(&update)
        .await
        .map_err(|e| PluginError::provider(ProviderStage::UpdateClient, e))?;
    log.log("Successfully updated client");

    Ok((new_read, new_write))
}
