//! A configured validator: data, parsed rules, messages and the errors of the last run

use crate::error::ValidationErrors;
use crate::messages::{format_message, Labels, Messages};
use crate::rules::RuleSet;
use crate::traits::ValidationRule;
use crate::Data;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// One rule bound to the field it checks
#[derive(Clone)]
pub(crate) struct ParsedRule {
    field: String,
    rule: Arc<dyn ValidationRule>,
}

impl ParsedRule {
    pub(crate) fn new(field: String, rule: Arc<dyn ValidationRule>) -> Self {
        Self { field, rule }
    }
}

/// Validator produced by [`ValidatorFactory::make`](crate::ValidatorFactory::make)
#[derive(Clone)]
pub struct Validator {
    data: Data,
    parsed: Vec<ParsedRule>,
    rules: RuleSet,
    messages: Messages,
    labels: Labels,
    errors: ValidationErrors,
}

impl Validator {
    pub(crate) fn new(
        data: Data,
        parsed: Vec<ParsedRule>,
        rules: RuleSet,
        messages: Messages,
        labels: Labels,
    ) -> Self {
        Self {
            data,
            parsed,
            rules,
            messages,
            labels,
            errors: ValidationErrors::new(),
        }
    }

    /// Run every rule against the data; true when nothing failed
    pub fn passes(&mut self) -> bool {
        let mut errors = ValidationErrors::new();

        for parsed in &self.parsed {
            let value = self.data.get(&parsed.field).unwrap_or(&Value::Null);

            if !parsed.rule.implicit() && is_absent(value) {
                continue;
            }

            if let Err(failures) = parsed.rule.validate(value, &parsed.field, &self.data) {
                for mut error in failures.errors.into_values().flatten() {
                    error.field = parsed.field.clone();
                    error.message = format_message(&error, &self.messages, &self.labels);
                    errors.add(error);
                }
            }
        }

        tracing::debug!(
            rules = self.parsed.len(),
            failed_fields = errors.len(),
            "validation run finished"
        );

        self.errors = errors;
        self.errors.is_empty()
    }

    /// Inverse of [`passes`](Self::passes)
    pub fn fails(&mut self) -> bool {
        !self.passes()
    }

    /// Errors from the last run
    pub fn messages(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Data the validator checks
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Rule set the validator was built from
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn custom_messages(&self) -> &Messages {
        &self.messages
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<String> = self
            .parsed
            .iter()
            .map(|p| format!("{}:{}", p.field, p.rule.rule_name()))
            .collect();

        f.debug_struct("Validator")
            .field("rules", &rules)
            .field("errors", &self.errors)
            .finish()
    }
}

/// Missing, null and empty-string values only reach implicit rules
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::{Data, Labels, Messages, RuleSet, ValidatorFactory};
    use serde_json::json;

    fn data(value: serde_json::Value) -> Data {
        match value {
            serde_json::Value::Object(map) => map,
            _ => Data::new(),
        }
    }

    #[test]
    fn test_passes_with_valid_data() {
        let rules = RuleSet::new()
            .field("email", "required|email")
            .field("name", "required|min:2");
        let input = data(json!({"email": "jane@example.com", "name": "Jane"}));

        let mut validator = ValidatorFactory::new()
            .make(&input, &rules, &Messages::new(), &Labels::new())
            .unwrap();

        assert!(validator.passes());
        assert!(validator.messages().is_empty());
        assert_eq!(validator.data(), &input);
        assert_eq!(validator.rules(), &rules);
    }

    #[test]
    fn test_collects_messages_per_field_in_order() {
        let rules = RuleSet::new()
            .field("name", "required")
            .field("email", "required|email");
        let input = data(json!({"email": "not-an-email"}));

        let mut validator = ValidatorFactory::new()
            .make(&input, &rules, &Messages::new(), &Labels::new())
            .unwrap();

        assert!(validator.fails());
        let errors = validator.messages();
        let fields: Vec<&String> = errors.errors.keys().collect();
        assert_eq!(fields, vec!["name", "email"]);
        assert_eq!(errors.first("name"), Some("The name field is required."));
        assert_eq!(errors.first("email"), Some("The email must be a valid email address."));
    }

    #[test]
    fn test_optional_fields_skip_non_implicit_rules() {
        let rules = RuleSet::new().field("website", "min:5|alpha");
        let input = data(json!({"website": ""}));

        let mut validator = ValidatorFactory::new()
            .make(&input, &rules, &Messages::new(), &Labels::new())
            .unwrap();

        assert!(validator.passes());
    }

    #[test]
    fn test_custom_messages_and_labels() {
        let rules = RuleSet::new().field("first_name", "required");
        let mut messages = Messages::new();
        messages.insert("first_name.required".into(), "Tell us your :attribute".into());
        let mut labels = Labels::new();
        labels.insert("first_name".into(), "given name".into());

        let mut validator = ValidatorFactory::new()
            .make(&Data::new(), &rules, &messages, &labels)
            .unwrap();

        assert!(validator.fails());
        assert_eq!(validator.messages().first("first_name"), Some("Tell us your given name"));
    }

    #[test]
    fn test_errors_are_replaced_on_each_run() {
        let rules = RuleSet::new().field("name", "required");
        let mut validator = ValidatorFactory::new()
            .make(&Data::new(), &rules, &Messages::new(), &Labels::new())
            .unwrap();

        assert!(validator.fails());
        assert!(validator.fails());
        assert_eq!(validator.messages().total_errors(), 1);
    }

    #[test]
    fn test_confirmed_rule() {
        let rules = RuleSet::new().field("password", "required|confirmed");
        let input = data(json!({"password": "secret", "password_confirmation": "secret"}));

        let mut validator = ValidatorFactory::new()
            .make(&input, &rules, &Messages::new(), &Labels::new())
            .unwrap();
        assert!(validator.passes());
    }
}
