//! Locates a numeric reading inside a provider's JSON response.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("nothing at '{0}'")]
    Missing(String),
    #[error("array at '{0}' is empty")]
    EmptyArray(String),
    #[error("field '{0}' not present")]
    MissingField(String),
    #[error("value is not numeric: {0}")]
    NotNumeric(String),
}

/// Resolves `pointer` in `doc`, steps into the last element if it lands on
/// an array, reads `field` if given, and coerces the result to a number.
/// Numeric strings such as `"71.4"` are accepted.
pub fn extract_value(doc: &Value, pointer: &str, field: Option<&str>) -> Result<f64, ExtractError> {
    let mut node = doc
        .pointer(pointer)
        .ok_or_else(|| ExtractError::Missing(pointer.to_string()))?;

    if let Value::Array(items) = node {
        node = items
            .last()
            .ok_or_else(|| ExtractError::EmptyArray(pointer.to_string()))?;
    }

    if let Some(field) = field {
        node = node
            .get(field)
            .ok_or_else(|| ExtractError::MissingField(field.to_string()))?;
    }

    let value = match node {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| ExtractError::NotNumeric(node.to_string()))
}
