//! Validation failures and rule definition errors

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// One failed rule on one field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationError {
    pub field: String,
    /// Message template until the validator formats it
    pub message: String,
    /// Name of the failed rule, also the key for custom messages
    pub code: String,
    /// Rule parameters available to message placeholders
    pub context: Option<serde_json::Value>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_code(field, message, "invalid")
    }

    pub fn with_code(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
            context: None,
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.code, self.message)
    }
}

/// Error bag of a validation run: failures grouped by field in report order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ValidationErrors {
    pub errors: IndexMap<String, Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors
            .entry(error.field.clone())
            .or_default()
            .push(error);
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.add(ValidationError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with at least one failure
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Number of failures over all fields
    pub fn total_errors(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn get_field_errors(&self, field: &str) -> Option<&Vec<ValidationError>> {
        self.errors.get(field)
    }

    pub fn has_field_errors(&self, field: &str) -> bool {
        self.errors.get(field).map_or(false, |errors| !errors.is_empty())
    }

    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.errors
            .get(field)
            .map(|errors| errors.iter().map(|e| e.message.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|errors| errors.first())
            .map(|e| e.message.as_str())
    }

    pub fn all_messages(&self) -> Vec<&str> {
        self.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.values().flatten()
    }

    /// Append `other`'s failures, keeping this bag's field order first
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, errors) in other.errors {
            self.errors.entry(field).or_default().extend(errors);
        }
    }

    pub fn from_error(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "no validation errors");
        }
        let summary: Vec<String> = self
            .errors
            .iter()
            .map(|(field, errors)| format!("{} ({})", field, errors.len()))
            .collect();
        write!(f, "invalid fields: {}", summary.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::from_error(error)
    }
}

/// Errors raised while turning rule expressions into validators
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    /// No built-in or registered rule carries this name
    #[error("Unknown validation rule: {rule}")]
    UnknownRule { rule: String },

    #[error("Invalid parameters for rule '{rule}': {message}")]
    InvalidParameters { rule: String, message: String },

    /// A `unique` rule was used without a presence verifier
    #[error("Rule '{rule}' requires a presence verifier")]
    MissingPresenceVerifier { rule: String },
}

impl RuleError {
    pub fn invalid_parameters(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag() -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::with_code("email", "The email field is required.", "required"));
        errors.add(ValidationError::with_code("age", "The age must be at least 18.", "min"));
        errors.add(ValidationError::with_code("email", "The email must be a valid email address.", "email"));
        errors
    }

    #[test]
    fn test_errors_group_by_field_in_report_order() {
        let errors = bag();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.total_errors(), 3);
        assert_eq!(errors.errors.keys().collect::<Vec<_>>(), vec!["email", "age"]);
        assert_eq!(errors.first("email"), Some("The email field is required."));
        assert_eq!(errors.messages_for("email").len(), 2);
        assert!(!errors.has_field_errors("name"));
        assert_eq!(errors.iter().map(|e| e.code.as_str()).collect::<Vec<_>>(), vec!["required", "email", "min"]);
    }

    #[test]
    fn test_merge_appends_per_field() {
        let mut errors = bag();
        let mut more = ValidationErrors::new();
        more.add_error("age", "Too young");
        more.add_error("name", "Missing");

        errors.merge(more);
        assert_eq!(errors.messages_for("age"), vec!["The age must be at least 18.", "Too young"]);
        assert_eq!(errors.errors.keys().last().map(String::as_str), Some("name"));
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::with_code("bio", "Too short", "min").context(json!({"min": 3})));

        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value["bio"][0]["code"], json!("min"));
        assert_eq!(value["bio"][0]["context"]["min"], json!(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(ValidationErrors::new().to_string(), "no validation errors");
        assert_eq!(bag().to_string(), "invalid fields: email (2), age (1)");
        assert_eq!(
            RuleError::UnknownRule { rule: "shiny".to_string() }.to_string(),
            "Unknown validation rule: shiny"
        );
    }
}
