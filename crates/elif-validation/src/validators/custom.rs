//! Custom validation functions and closures

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use crate::Data;
use serde_json::Value;
use std::sync::Arc;

/// Type alias for validation closures
pub type SyncValidationFn = Arc<dyn Fn(&Value, &str, &Data) -> ValidationResult<()> + Send + Sync>;

/// Custom validator that accepts user-defined validation functions.
///
/// Registered on a [`ValidatorFactory`](crate::ValidatorFactory) under its
/// name, it becomes usable in rule strings like any built-in rule.
#[derive(Clone)]
pub struct CustomValidator {
    /// Name/identifier for this custom validator
    pub name: String,
    validator: SyncValidationFn,
    /// Custom error message
    pub message: Option<String>,
}

impl CustomValidator {
    /// Create a new custom validator from a closure
    pub fn new<F>(name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value, &str, &Data) -> ValidationResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            validator: Arc::new(validator),
            message: None,
        }
    }

    /// Create a validator from a predicate; failures use the rule name as code
    pub fn from_predicate<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        let code = name.clone();
        Self::new(name, move |value, field, _data| {
            if predicate(value) {
                Ok(())
            } else {
                Err(ValidationError::with_code(field, "The :attribute is invalid.", code.clone()).into())
            }
        })
    }

    /// Set custom error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Get the validator name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for CustomValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomValidator")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish()
    }
}

impl ValidationRule for CustomValidator {
    fn validate(&self, value: &Value, field: &str, data: &Data) -> ValidationResult<()> {
        // Skip validation for null values (unless custom validator explicitly handles them)
        if value.is_null() {
            return Ok(());
        }

        // If validation failed and we have a custom message, replace the error message
        match ((self.validator)(value, field, data), &self.message) {
            (Err(mut errors), Some(custom_message)) => {
                for field_errors in errors.errors.values_mut() {
                    for error in field_errors {
                        error.message = custom_message.clone();
                    }
                }
                Err(errors)
            }
            (result, _) => result,
        }
    }

    fn rule_name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Option<Value> {
        let mut params = serde_json::Map::new();

        params.insert("name".to_string(), Value::String(self.name.clone()));

        if let Some(ref message) = self.message {
            params.insert("message".to_string(), Value::String(message.clone()));
        }

        Some(Value::Object(params))
    }
}
