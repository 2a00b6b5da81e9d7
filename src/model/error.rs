//! Model Errors
//!
//! Errors raised by the mapping engine. Malformed nesting, failed pattern
//! extraction and key collisions are absorbed where they happen and never
//! show up here.

use thiserror::Error;

/// Errors surfaced to callers of the mapping engine
#[derive(Error, Debug)]
pub enum ModelError {
    /// A read targeted a field the type has no accessor for
    #[error("Unknown field '{field}' on {type_name}")]
    UnknownField { type_name: String, field: String },

    /// A reused nested type has no accessor for some fields of a new payload
    #[error("Payload for {type_name} has fields without accessors: {}", .fields.join(", "))]
    ShapeMismatch {
        type_name: String,
        fields: Vec<String>,
    },

    /// A model was constructed from something other than a JSON object
    #[error("Cannot build {type_name} from a JSON {found}")]
    NotAnObject {
        type_name: String,
        found: &'static str,
    },

    /// A list response was neither an array nor an object with a `value` array
    #[error("Cannot build a list of {type_name} from a JSON {found}")]
    NotACollection {
        type_name: String,
        found: &'static str,
    },

    /// Invalid type definition in a catalog
    #[error("Invalid catalog: {0}")]
    Catalog(String),

    /// Payload text was not valid JSON
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read a response from the transport layer
    #[error("Failed to read response: {0}")]
    Http(#[from] reqwest::Error),
}

impl ModelError {
    /// Creates an `UnknownField` error.
    pub fn unknown_field(type_name: &str, field: impl Into<String>) -> Self {
        Self::UnknownField {
            type_name: type_name.to_string(),
            field: field.into(),
        }
    }

    /// Creates a `Catalog` error.
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog(message.into())
    }
}

/// Name of a JSON value's kind, for error messages
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_mismatch_lists_fields() {
        let err = ModelError::ShapeMismatch {
            type_name: "VirtualMachine::Properties".to_string(),
            fields: vec!["b".to_string(), "c".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Payload for VirtualMachine::Properties has fields without accessors: b, c"
        );
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!([1])), "array");
        assert_eq!(json_kind(&json!("x")), "string");
        assert_eq!(json_kind(&json!(null)), "null");
    }
}
