//! Core validation traits for the elif framework

use crate::error::ValidationResult;
use crate::Data;
use serde_json::Value;

/// Core validation trait that all validators must implement
pub trait ValidationRule: Send + Sync {
    /// Validate a single value; `data` is the full attribute set under validation
    fn validate(&self, value: &Value, field: &str, data: &Data) -> ValidationResult<()>;

    /// Get the validation rule name/type
    fn rule_name(&self) -> &str;

    /// Implicit rules also run when the value is missing, null or an empty string
    fn implicit(&self) -> bool {
        false
    }

    /// Get validation rule parameters/configuration as JSON
    fn parameters(&self) -> Option<Value> {
        None
    }
}

/// Looks up existing rows for the `unique` rule
pub trait PresenceVerifier: Send + Sync {
    /// Count rows in `table` whose `column` equals `value`.
    ///
    /// Rows whose `id_column` equals `excluded_id` are left out, and every
    /// `(column, value)` pair in `extra` must also match.
    fn count(
        &self,
        table: &str,
        column: &str,
        value: &Value,
        excluded_id: Option<&str>,
        id_column: &str,
        extra: &[(String, String)],
    ) -> usize;
}

/// Textual form of a scalar value, the way rule parameters compare against it
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ValidationError, ValidationErrors};

    struct NoSpaces;

    impl ValidationRule for NoSpaces {
        fn validate(&self, value: &Value, field: &str, _data: &Data) -> ValidationResult<()> {
            if value.as_str().map_or(false, |s| s.contains(' ')) {
                return Err(ValidationErrors::from_error(ValidationError::with_code(
                    field,
                    "The :attribute may not contain spaces.",
                    "no_spaces",
                )));
            }
            Ok(())
        }

        fn rule_name(&self) -> &str {
            "no_spaces"
        }
    }

    #[test]
    fn test_rule_defaults() {
        let rule = NoSpaces;
        assert!(!rule.implicit());
        assert!(rule.parameters().is_none());
        assert_eq!(rule.rule_name(), "no_spaces");
    }

    #[test]
    fn test_rule_validation() {
        let rule = NoSpaces;
        let data = Data::new();

        assert!(rule.validate(&Value::String("john".into()), "login", &data).is_ok());
        let errors = rule
            .validate(&Value::String("john doe".into()), "login", &data)
            .unwrap_err();
        assert!(errors.has_field_errors("login"));
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&Value::String("a".into())), "a");
        assert_eq!(value_to_string(&serde_json::json!(7)), "7");
        assert_eq!(value_to_string(&Value::Bool(true)), "true");
        assert_eq!(value_to_string(&Value::Null), "");
    }
}
