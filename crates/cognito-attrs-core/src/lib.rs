//! # cognito-attrs-core
//!
//! Reconciles declared custom attributes onto existing Cognito user pools and
//! grants app clients read/write access to them, once per deployment.
//!
//! ## Overview
//!
//! - [`normalize_attribute_name`] and [`missing_attributes`] hold the diff logic.
//! - [`load_mappings`] turns the raw configuration block into [`MappingEntry`] values.
//! - [`process_mapping`] reconciles one entry against a [`ProviderGateway`].
//! - [`run`] describes the stack once and processes every entry.
//! - [`CognitoAddCustomAttributesPlugin`] binds [`run`] to the
//!   `after:deploy:deploy` lifecycle event through a [`HookRegistry`].
//!
//! The crate has no provider implementation of its own; `cognito-attrs-aws`
//! provides one over the AWS SDK.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cognito_attrs_core::{run, RunOptions, TracingLogSink};
//!
//! let raw = serde_json::json!({
//!     "CognitoUserPoolIdOutputKey": "UserPoolId",
//!     "CognitoUserPoolClientIdOutputKey": "UserPoolClientId",
//!     "CustomAttributes": [{ "Name": "tenant", "AttributeDataType": "String" }]
//! });
//!
//! let summary = run(gateway.as_ref(), &raw, &TracingLogSink, RunOptions::default()).await?;
//! ```

pub mod attribute;
pub mod dry_run;
mod error;
pub mod gateway;
pub mod hooks;
pub mod log;
pub mod mapping;
pub mod orchestrator;
mod plugin;
pub mod processor;
pub mod resolver;
pub mod stack;

pub use attribute::{
    AttributeDataType, AttributeSpec, CUSTOM_ATTRIBUTE_PREFIX, NumberAttributeConstraints,
    StringAttributeConstraints, normalize_attribute_name,
};
pub use dry_run::{DryRunGateway, PlannedChange};
pub use error::{GatewayError, PluginError, PluginResult, ProviderStage};
pub use gateway::{
    ClientAttributeUpdate, ClientGateway, DynGateway, ProviderGateway, StackGateway,
    UserPoolClient, UserPoolGateway, UserPoolSchema,
};
pub use hooks::{HookError, HookRegistry, LifecycleEvent, LifecycleHook};
pub use log::{LogSink, MemoryLogSink, PLUGIN_NAME, TracingLogSink};
pub use mapping::{CONFIG_KEY, MappingEntry, load_from_custom, load_mappings};
pub use orchestrator::{RunOptions, RunSummary, run, run_entries};
pub use plugin::CognitoAddCustomAttributesPlugin;
pub use processor::{EntryOutcome, process_mapping};
pub use resolver::missing_attributes;
pub use stack::{StackDescriptor, StackOutput};
