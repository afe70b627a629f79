//! YAML parsing helpers shared by front matter and navigation manifests.

use serde_yaml::{Mapping, Value};

use crate::MetaError;

/// Parse YAML text whose top level must be a mapping.
///
/// Empty or whitespace-only text (and an explicit `null` document) yields an
/// empty mapping.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or its top level is not a mapping.
pub fn parse_mapping(content: &str) -> Result<Mapping, MetaError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Mapping::new());
    }

    match serde_yaml::from_str::<Value>(trimmed)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(MetaError::NotAMapping),
    }
}

/// Serialize a mapping as block-style YAML without a document marker.
///
/// # Errors
///
/// Returns an error if a value cannot be represented in YAML.
pub fn to_yaml_string(values: &Mapping) -> Result<String, MetaError> {
    Ok(serde_yaml::to_string(values)?)
}
