//! Set difference between desired and existing attributes.

use std::collections::HashSet;

use crate::attribute::{AttributeSpec, normalize_attribute_name};

/// Returns the desired attributes that are not yet present remotely.
///
/// Both sides are compared by their normalized (`custom:`-prefixed) names with
/// an exact, case-sensitive match. The result keeps the order of `desired`.
/// Attributes that exist remotely but are not desired are ignored: the
/// reconciliation only ever adds.
pub fn missing_attributes<S: AsRef<str>>(
    desired: &[AttributeSpec],
    existing: &[S],
) -> Vec<AttributeSpec> {
    let existing: HashSet<String> = existing
        .iter()
        .map(|name| normalize_attribute_name(name.as_ref()))
        .collect();

    desired
        .iter()
        .filter(|attribute| !existing.contains(&attribute.normalized_name()))
        .cloned()
        .collect()
}

/// Normalized names of the given attributes, in order.
pub fn normalized_names(attributes: &[AttributeSpec]) -> Vec<String> {
    attributes.iter().map(AttributeSpec::normalized_name).collect()
}
