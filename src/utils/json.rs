use serde_json::Value;

use crate::core::error::WorkflowError;

/// Returns a top-level string field. Absent, non-string and empty values
/// all count as missing.
pub fn string_field(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Like [`string_field`] but addressed by JSON pointer, e.g. `/error/message`.
pub fn string_at(body: &Value, pointer: &str) -> Option<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn required_string_field(
    body: &Value,
    field: &'static str,
    operation: &'static str,
) -> Result<String, WorkflowError> {
    string_field(body, field).ok_or(WorkflowError::MissingField { operation, field })
}
