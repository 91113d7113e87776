//! `required` rule

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use crate::Data;
use serde_json::Value;

/// Null, blank strings and empty collections count as missing; `0` and `false` do not
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Fails when the field is missing or blank. Runs even for absent values.
#[derive(Debug, Clone, Default)]
pub struct RequiredValidator {
    message: Option<String>,
}

impl RequiredValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

impl ValidationRule for RequiredValidator {
    fn validate(&self, value: &Value, field: &str, _data: &Data) -> ValidationResult<()> {
        if !is_blank(value) {
            return Ok(());
        }
        let message = self
            .message
            .as_deref()
            .unwrap_or("The :attribute field is required.");
        Err(ValidationError::with_code(field, message, "required").into())
    }

    fn rule_name(&self) -> &str {
        "required"
    }

    fn implicit(&self) -> bool {
        true
    }
}
