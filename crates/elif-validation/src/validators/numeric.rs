//! Numeric value validators

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use crate::Data;
use serde_json::Value;

/// Validator for numeric values and numeric bounds
#[derive(Debug, Clone)]
pub struct NumericValidator {
    /// Minimum value (inclusive)
    pub min: Option<f64>,
    /// Maximum value (inclusive)
    pub max: Option<f64>,
    /// Exact value required
    pub exact: Option<f64>,
    /// Allow only integers (no decimals)
    pub integer_only: bool,
    /// Reject values that are not numbers; bound-only validators let them through
    pub require_number: bool,
    /// Custom error message
    pub message: Option<String>,
}

impl NumericValidator {
    /// Validator for the `numeric` rule
    pub fn new() -> Self {
        Self {
            min: None,
            max: None,
            exact: None,
            integer_only: false,
            require_number: true,
            message: None,
        }
    }

    /// Validator that only checks bounds, leaving type checks to `numeric`/`integer`
    pub fn bounds() -> Self {
        Self {
            require_number: false,
            ..Self::new()
        }
    }

    /// Set minimum value constraint
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set maximum value constraint
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Set value range (min and max)
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Require an exact value
    pub fn exact(mut self, exact: f64) -> Self {
        self.exact = Some(exact);
        self
    }

    /// Require integer values only (no decimals)
    pub fn integer_only(mut self, integer_only: bool) -> Self {
        self.integer_only = integer_only;
        self
    }

    /// Set custom error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Extract numeric value from JSON Value
    fn get_numeric_value(&self, value: &Value) -> Option<f64> {
        match value {
            Value::Number(num) => num.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    fn code(&self) -> &'static str {
        match (self.exact, self.min, self.max) {
            (Some(_), _, _) => "size",
            (None, Some(_), Some(_)) => "between",
            (None, Some(_), None) => "min",
            (None, None, Some(_)) => "max",
            (None, None, None) if self.integer_only => "integer",
            _ => "numeric",
        }
    }

    fn failure(&self, field: &str, code: &'static str) -> ValidationError {
        let default_template = match code {
            "integer" => "The :attribute must be an integer.",
            "numeric" => "The :attribute must be a number.",
            "size" => "The :attribute must be :size.",
            "between" => "The :attribute must be between :min and :max.",
            "min" => "The :attribute must be at least :min.",
            _ => "The :attribute may not be greater than :max.",
        };
        let template = self
            .message
            .clone()
            .unwrap_or_else(|| default_template.to_string());

        let mut context = serde_json::Map::new();
        for (key, bound) in [("size", self.exact), ("min", self.min), ("max", self.max)] {
            if let Some(bound) = bound {
                context.insert(key.to_string(), format_number(bound).into());
            }
        }

        ValidationError::with_code(field, template, code).context(Value::Object(context))
    }
}

impl Default for NumericValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Render whole numbers without a trailing `.0`
fn format_number(num: f64) -> String {
    if num.fract() == 0.0 && num.abs() < 1e15 {
        format!("{}", num as i64)
    } else {
        num.to_string()
    }
}

impl ValidationRule for NumericValidator {
    fn validate(&self, value: &Value, field: &str, _data: &Data) -> ValidationResult<()> {
        // Skip validation for null values
        if value.is_null() {
            return Ok(());
        }

        let num = match self.get_numeric_value(value) {
            Some(n) if n.is_finite() => n,
            _ if self.require_number => {
                let code = if self.integer_only { "integer" } else { "numeric" };
                return Err(self.failure(field, code).into());
            }
            _ => return Ok(()),
        };

        if self.integer_only && num.fract() != 0.0 {
            return Err(self.failure(field, "integer").into());
        }

        let below = self.min.map_or(false, |min| num < min);
        let above = self.max.map_or(false, |max| num > max);
        let mismatch = self.exact.map_or(false, |exact| num != exact);

        if below || above || mismatch {
            return Err(self.failure(field, self.code()).into());
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
        params.insert("integer_only".to_string(), Value::Bool(self.integer_only));

        Some(Value::Object(params))
    }
}
