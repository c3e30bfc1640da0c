//! Error message extraction
//!
//! Django REST Framework reports failures in several shapes. The first
//! human-readable string found wins, in this order: `message`, `detail`,
//! `errors.nonFieldErrors`, `errors.non_field_errors`, top-level
//! `nonFieldErrors`, `non_field_errors`, then the first field error.

use serde_json::Value;

/// Pull a user-facing message out of an error response body.
pub fn error_message(body: &Value) -> Option<String> {
    let errors = body.get("errors");

    ["message", "detail"]
        .iter()
        .find_map(|key| body.get(key).and_then(first_string))
        .or_else(|| {
            errors.and_then(|errors| {
                ["nonFieldErrors", "non_field_errors"]
                    .iter()
                    .find_map(|key| errors.get(key).and_then(first_string))
            })
        })
        .or_else(|| {
            ["nonFieldErrors", "non_field_errors"]
                .iter()
                .find_map(|key| body.get(key).and_then(first_string))
        })
        .or_else(|| first_field_error(errors.unwrap_or(body)))
        .map(str::to_string)
}

fn first_string(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.as_str()),
        Value::Array(items) => items.iter().find_map(first_string),
        _ => None,
    }
}

fn first_field_error(value: &Value) -> Option<&str> {
    match value {
        Value::Object(fields) => fields.values().find_map(first_string),
        Value::Array(_) => first_string(value),
        _ => None,
    }
}
