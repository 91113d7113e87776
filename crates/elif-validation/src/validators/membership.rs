//! Membership validator for the `in:<a>,<b>,...` rule

use crate::error::{ValidationError, ValidationResult};
use crate::traits::{value_to_string, ValidationRule};
use crate::Data;
use serde_json::Value;

/// Validator requiring the value to be one of a fixed set of choices
#[derive(Debug, Clone)]
pub struct InValidator {
    /// Accepted values, compared as strings
    pub choices: Vec<String>,
    /// Custom error message
    pub message: Option<String>,
}

impl InValidator {
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    /// Set custom error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::Array(items) => items.iter().all(|item| self.accepts(item)),
            Value::Object(_) => false,
            scalar => {
                let text = value_to_string(scalar);
                self.choices.iter().any(|choice| *choice == text)
            }
        }
    }
}

impl ValidationRule for InValidator {
    fn validate(&self, value: &Value, field: &str, _data: &Data) -> ValidationResult<()> {
        if value.is_null() || self.accepts(value) {
            return Ok(());
        }

        let message = self
            .message
            .clone()
            .unwrap_or_else(|| "The selected :attribute is invalid.".to_string());

        Err(ValidationError::with_code(field, message, "in").into())
    }

    fn rule_name(&self) -> &str {
        "in"
    }

    fn parameters(&self) -> Option<Value> {
        Some(serde_json::json!({ "choices": self.choices }))
    }
}
