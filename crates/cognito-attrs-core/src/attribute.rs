//! Custom attribute definitions and name normalization.
//!
//! Cognito stores every caller-defined attribute under the `custom:` namespace,
//! while deployment configuration usually names them bare (`tenant` rather than
//! `custom:tenant`). All comparisons between configured and remote names go
//! through [`normalize_attribute_name`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespace prefix Cognito reserves for custom attributes.
pub const CUSTOM_ATTRIBUTE_PREFIX: &str = "custom:";

/// Returns the namespaced form of an attribute name.
///
/// Names that already carry [`CUSTOM_ATTRIBUTE_PREFIX`] are returned unchanged,
/// so applying this more than once is harmless.
pub fn normalize_attribute_name(name: &str) -> String {
    if name.starts_with(CUSTOM_ATTRIBUTE_PREFIX) {
        name.to_string()
    } else {
        format!("{CUSTOM_ATTRIBUTE_PREFIX}{name}")
    }
}

/// Data type of a custom attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttributeDataType {
    #[default]
    String,
    Number,
    DateTime,
    Boolean,
}

impl AttributeDataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::DateTime => "DateTime",
            Self::Boolean => "Boolean",
        }
    }
}

impl fmt::Display for AttributeDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounds for `Number` attributes, kept as strings the way Cognito does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NumberAttributeConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
}

/// Length bounds for `String` attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StringAttributeConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<String>,
}

/// A caller-declared custom attribute.
///
/// Field names follow Cognito's `SchemaAttributeType` so definitions can be
/// copied between deployment templates and this configuration. Only `name`
/// takes part in reconciliation; everything else is handed to the provider
/// as-is, and unset fields are left to the provider's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeSpec {
    pub name: String,

    #[serde(default)]
    pub attribute_data_type: AttributeDataType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_only_attribute: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_attribute_constraints: Option<NumberAttributeConstraints>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_attribute_constraints: Option<StringAttributeConstraints>,
}

impl AttributeSpec {
    /// Creates a `String` attribute with provider defaults for everything else.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_data_type: AttributeDataType::String,
            developer_only_attribute: None,
            mutable: None,
            required: None,
            number_attribute_constraints: None,
            string_attribute_constraints: None,
        }
    }

    #[must_use]
    pub fn with_data_type(mut self, data_type: AttributeDataType) -> Self {
        self.attribute_data_type = data_type;
        self
    }

    #[must_use]
    pub fn with_mutable(mut self, mutable: bool) -> Self {
        self.mutable = Some(mutable);
        self
    }

    /// The attribute's name in the `custom:` namespace.
    pub fn normalized_name(&self) -> String {
        normalize_attribute_name(&self.name)
    }
}
