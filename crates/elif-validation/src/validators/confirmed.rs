//! Cross-field equality: `confirmed` and `same:<other>`

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use crate::Data;
use serde_json::Value;

/// Validator requiring a field to equal another field in the same data
#[derive(Debug, Clone)]
pub struct ConfirmedValidator {
    /// Field whose value must match; `None` means `<field>_confirmation`
    pub other: Option<String>,
    /// Custom error message
    pub message: Option<String>,
}

impl ConfirmedValidator {
    /// `confirmed`: compare against `<field>_confirmation`
    pub fn new() -> Self {
        Self {
            other: None,
            message: None,
        }
    }

    /// `same:<other>`: compare against an explicit field
    pub fn same_as(other: impl Into<String>) -> Self {
        Self {
            other: Some(other.into()),
            message: None,
        }
    }

    /// Set custom error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn other_field(&self, field: &str) -> String {
        self.other
            .clone()
            .unwrap_or_else(|| format!("{}_confirmation", field))
    }
}

impl Default for ConfirmedValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationRule for ConfirmedValidator {
    fn validate(&self, value: &Value, field: &str, data: &Data) -> ValidationResult<()> {
        let other = self.other_field(field);

        if data.get(&other) == Some(value) {
            return Ok(());
        }

        let error = match self.other {
            None => ValidationError::with_code(
                field,
                self.message
                    .clone()
                    .unwrap_or_else(|| "The :attribute confirmation does not match.".to_string()),
                "confirmed",
            ),
            Some(_) => ValidationError::with_code(
                field,
                self.message
                    .clone()
                    .unwrap_or_else(|| "The :attribute and :other must match.".to_string()),
                "same",
            )
            .context(serde_json::json!({ "other": other })),
        };

        Err(error.into())
    }

    fn rule_name(&self) -> &str {
        if self.other.is_some() {
            "same"
        } else {
            "confirmed"
        }
    }

    fn parameters(&self) -> Option<Value> {
        self.other
            .as_ref()
            .map(|other| serde_json::json!({ "other": other }))
    }
}
