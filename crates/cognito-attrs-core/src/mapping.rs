//! Mapping entries and the loader that builds them from raw configuration.
//!
//! The configuration block may hold a single mapping object or a list of
//! them. The loader normalizes both shapes into a plain `Vec<MappingEntry>`,
//! dropping (and logging) any entry that is missing required fields. Callers
//! never see the dropped entries.

use serde::Serialize;
use serde_json::Value;

use crate::attribute::AttributeSpec;
use crate::log::LogSink;

/// Key of the plugin's block inside a service's `custom` section.
pub const CONFIG_KEY: &str = "CognitoAddCustomAttributes";

/// Field names accepted in a mapping object.
pub mod params {
    pub const USER_POOL_OUTPUT_KEY: &str = "CognitoUserPoolIdOutputKey";
    pub const CLIENT_OUTPUT_KEY: &str = "CognitoUserPoolClientIdOutputKey";
    pub const CUSTOM_ATTRIBUTES: &str = "CustomAttributes";

    pub(crate) const USER_POOL_OUTPUT_KEY_ALIAS: &str = "userPoolOutputKey";
    pub(crate) const CLIENT_OUTPUT_KEY_ALIAS: &str = "clientOutputKey";
    pub(crate) const CUSTOM_ATTRIBUTES_ALIAS: &str = "customAttributes";
}

/// One unit of reconciliation work: a user pool, an optional app client and
/// the attributes both should end up with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    pub user_pool_output_key: String,
    pub client_output_key: Option<String>,
    pub custom_attributes: Vec<AttributeSpec>,
}

impl MappingEntry {
    pub fn new(user_pool_output_key: impl Into<String>, custom_attributes: Vec<AttributeSpec>) -> Self {
        Self {
            user_pool_output_key: user_pool_output_key.into(),
            client_output_key: None,
            custom_attributes,
        }
    }

    #[must_use]
    pub fn with_client_output_key(mut self, key: impl Into<String>) -> Self {
        self.client_output_key = Some(key.into());
        self
    }
}

/// Loads mapping entries from the plugin's configuration block.
///
/// `raw` is either one mapping object or an array of them. Entries that fail
/// validation are logged to `log` and left out of the result.
pub fn load_mappings(raw: &Value, log: &dyn LogSink) -> Vec<MappingEntry> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| parse_mapping(item, log))
            .collect(),
        Value::Null => Vec::new(),
        item => parse_mapping(item, log).into_iter().collect(),
    }
}

/// Loads mapping entries from a service's `custom` section.
///
/// Returns an empty list when the section or the [`CONFIG_KEY`] block is absent.
pub fn load_from_custom(custom: Option<&Value>, log: &dyn LogSink) -> Vec<MappingEntry> {
    match custom.and_then(|c| c.get(CONFIG_KEY)) {
        Some(raw) => load_mappings(raw, log),
        None => Vec::new(),
    }
}

fn field<'a>(item: &'a Value, name: &str, alias: &str) -> Option<&'a Value> {
    item.get(name).or_else(|| item.get(alias))
}

fn parse_mapping(item: &Value, log: &dyn LogSink) -> Option<MappingEntry> {
    let pool_key = field(item, params::USER_POOL_OUTPUT_KEY, params::USER_POOL_OUTPUT_KEY_ALIAS)
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty());
    // Null counts as absent; any other non-string value is rejected.
    let client_field = field(item, params::CLIENT_OUTPUT_KEY, params::CLIENT_OUTPUT_KEY_ALIAS)
        .filter(|value| !value.is_null());
    let client_key = client_field
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty());
    let client_invalid = client_field.is_some() && client_key.is_none();
    let attributes = field(item, params::CUSTOM_ATTRIBUTES, params::CUSTOM_ATTRIBUTES_ALIAS)
        .and_then(Value::as_array);

    let parsed = match (pool_key, attributes) {
        (None, _) => {
            log.log(&format!("{} is required.", params::USER_POOL_OUTPUT_KEY));
            None
        }
        (Some(_), None) => {
            log.log(&format!("{} array is required.", params::CUSTOM_ATTRIBUTES));
            None
        }
        (Some(_), Some(_)) if client_invalid => {
            log.log(&format!("{} must be a string.", params::CLIENT_OUTPUT_KEY));
            None
        }
        (Some(pool_key), Some(attributes)) => match parse_attributes(attributes) {
            Ok(custom_attributes) => Some(MappingEntry {
                user_pool_output_key: pool_key.to_string(),
                client_output_key: client_key.map(str::to_string),
                custom_attributes,
            }),
            Err(e) => {
                log.log(&format!(
                    "{} contains an invalid attribute definition: {e}",
                    params::CUSTOM_ATTRIBUTES
                ));
                None
            }
        },
    };

    if parsed.is_none() {
        log.log(&format!(
            "Custom Attribute is being skipped due to missing information. [{}: {}] [{}: {}]",
            params::USER_POOL_OUTPUT_KEY,
            pool_key.unwrap_or("undefined"),
            params::CLIENT_OUTPUT_KEY,
            client_key.unwrap_or("undefined"),
        ));
    }

    parsed
}

fn parse_attributes(values: &[Value]) -> Result<Vec<AttributeSpec>, serde_json::Error> {
    values
        .iter()
        .map(|value| serde_json::from_value(value.clone()))
        .collect()
}
