//! Length-based validators for strings and collections

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use crate::Data;
use serde_json::Value;

/// Validator for string/array length constraints (`min`, `max`, `between`, `size`)
#[derive(Debug, Clone)]
pub struct LengthValidator {
    /// Minimum length (inclusive)
    pub min: Option<usize>,
    /// Maximum length (inclusive)
    pub max: Option<usize>,
    /// Exact length required
    pub exact: Option<usize>,
    /// Custom error message
    pub message: Option<String>,
}

impl LengthValidator {
    /// Create a new length validator with no constraints
    pub fn new() -> Self {
        Self {
            min: None,
            max: None,
            exact: None,
            message: None,
        }
    }

    /// Set minimum length constraint
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    /// Set maximum length constraint
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Set exact length requirement
    pub fn exact(mut self, exact: usize) -> Self {
        self.exact = Some(exact);
        self
    }

    /// Set length range (min and max)
    pub fn range(mut self, min: usize, max: usize) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Set custom error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Get the length of a value (supports strings and arrays)
    fn get_length(&self, value: &Value) -> Option<usize> {
        match value {
            Value::String(s) => Some(s.chars().count()), // Unicode-aware length
            Value::Array(arr) => Some(arr.len()),
            _ => None,
        }
    }

    /// Rule name this validator reports, derived from its constraints
    fn code(&self) -> &'static str {
        match (self.exact, self.min, self.max) {
            (Some(_), _, _) => "size",
            (None, Some(_), Some(_)) => "between",
            (None, Some(_), None) => "min",
            _ => "max",
        }
    }

    fn template(&self) -> String {
        if let Some(ref custom_message) = self.message {
            return custom_message.clone();
        }

        let template = match self.code() {
            "size" => "The :attribute must be :size characters.",
            "between" => "The :attribute must be between :min and :max characters.",
            "min" => "The :attribute must be at least :min characters.",
            _ => "The :attribute may not be greater than :max characters.",
        };
        template.to_string()
    }

    fn failure(&self, field: &str) -> ValidationError {
        let mut context = serde_json::Map::new();
        if let Some(exact) = self.exact {
            context.insert("size".to_string(), Value::from(exact));
        }
        if let Some(min) = self.min {
            context.insert("min".to_string(), Value::from(min));
        }
        if let Some(max) = self.max {
            context.insert("max".to_string(), Value::from(max));
        }

        ValidationError::with_code(field, self.template(), self.code()).context(Value::Object(context))
    }
}

impl Default for LengthValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationRule for LengthValidator {
    fn validate(&self, value: &Value, field: &str, _data: &Data) -> ValidationResult<()> {
        // Skip validation for null values (use RequiredValidator for null checks)
        if value.is_null() {
            return Ok(());
        }

        let Some(length) = self.get_length(value) else {
            return Err(self.failure(field).into());
        };

        let too_short = self.min.map_or(false, |min| length < min);
        let too_long = self.max.map_or(false, |max| length > max);
        let wrong_size = self.exact.map_or(false, |exact| length != exact);

        if too_short || too_long || wrong_size {
            return Err(self.failure(field).into());
        }

        Ok(())
    }

    fn rule_name(&self) -> &str {
        self.code()
    }

    fn parameters(&self) -> Option<Value> {
        let mut params = serde_json::Map::new();

        if let Some(min) = self.min {
            params.insert("min".to_string(), Value::from(min));
        }
        if let Some(max) = self.max {
            params.insert("max".to_string(), Value::from(max));
        }
        if let Some(exact) = self.exact {
            params.insert("exact".to_string(), Value::from(exact));
        }

        if params.is_empty() {
            None
        } else {
            Some(Value::Object(params))
        }
    }
}
