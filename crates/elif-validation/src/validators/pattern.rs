//! Pattern-based validators using regular expressions

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use crate::Data;
use regex::{Regex, RegexBuilder};
use serde_json::Value;

/// Validator for regular expression patterns (`regex`, `alpha`, `alpha_num`, `alpha_dash`)
#[derive(Debug, Clone)]
pub struct PatternValidator {
    /// The regular expression pattern
    pattern: Regex,
    /// Rule name reported on failure
    code: String,
    /// Custom error message
    pub message: Option<String>,
    /// Whether to match the entire string (default) or just find a match
    pub full_match: bool,
}

impl PatternValidator {
    /// Create a new pattern validator
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::from_regex(Regex::new(pattern)?))
    }

    /// Create a validator from an existing Regex
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            pattern: regex,
            code: "regex".to_string(),
            message: None,
            full_match: false,
        }
    }

    /// Parse a delimited pattern such as `/^[a-z]+$/i`.
    ///
    /// Undelimited input is used as-is. The `i`, `m`, `s` and `x` flags are honoured.
    pub fn from_delimited(expr: &str) -> Result<Self, regex::Error> {
        let mut chars = expr.chars();
        let (body, flags) = match chars.next() {
            Some(delimiter) if matches!(delimiter, '/' | '#' | '~' | '!') => {
                let rest = chars.as_str();
                match rest.rfind(delimiter) {
                    Some(end) => (&rest[..end], &rest[end + delimiter.len_utf8()..]),
                    None => (rest, ""),
                }
            }
            _ => (expr, ""),
        };

        let regex = RegexBuilder::new(body)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .ignore_whitespace(flags.contains('x'))
            .build()?;

        Ok(Self::from_regex(regex))
    }

    /// Set custom error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the rule name reported on failure
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Set whether to match the full string or just find a match
    pub fn full_match(mut self, full_match: bool) -> Self {
        self.full_match = full_match;
        self
    }

    /// Get the pattern string
    pub fn pattern_string(&self) -> &str {
        self.pattern.as_str()
    }

    /// Validate the string against the pattern
    fn validate_pattern(&self, text: &str) -> bool {
        if self.full_match {
            self.pattern.find(text).map_or(false, |m| m.as_str() == text)
        } else {
            self.pattern.is_match(text)
        }
    }

    fn default_message(&self) -> &'static str {
        match self.code.as_str() {
            "alpha" => "The :attribute may only contain letters.",
            "alpha_num" => "The :attribute may only contain letters and numbers.",
            "alpha_dash" => "The :attribute may only contain letters, numbers, dashes and underscores.",
            _ => "The :attribute format is invalid.",
        }
    }
}

/// Common pattern validators for typical use cases
impl PatternValidator {
    /// Letters only
    pub fn alpha() -> Result<Self, regex::Error> {
        Ok(Self::new(r"^\p{L}+$")?.code("alpha"))
    }

    /// Letters and numbers
    pub fn alpha_num() -> Result<Self, regex::Error> {
        Ok(Self::new(r"^[\p{L}\p{N}]+$")?.code("alpha_num"))
    }

    /// Letters, numbers, dashes and underscores
    pub fn alpha_dash() -> Result<Self, regex::Error> {
        Ok(Self::new(r"^[\p{L}\p{N}_-]+$")?.code("alpha_dash"))
    }
}

impl ValidationRule for PatternValidator {
    fn validate(&self, value: &Value, field: &str, _data: &Data) -> ValidationResult<()> {
        // Skip validation for null values
        if value.is_null() {
            return Ok(());
        }

        let matched = match value {
            Value::String(text) => self.validate_pattern(text),
            Value::Number(num) => self.validate_pattern(&num.to_string()),
            _ => false,
        };

        if !matched {
            let message = self
                .message
                .clone()
                .unwrap_or_else(|| self.default_message().to_string());

            return Err(ValidationError::with_code(field, message, self.code.clone()).into());
        }

        Ok(())
    }

    fn rule_name(&self) -> &str {
        &self.code
    }

    fn parameters(&self) -> Option<Value> {
        let mut params = serde_json::Map::new();

        params.insert("pattern".to_string(), Value::String(self.pattern.as_str().to_string()));
        params.insert("full_match".to_string(), Value::Bool(self.full_match));

        if let Some(ref message) = self.message {
            params.insert("message".to_string(), Value::String(message.clone()));
        }

        Some(Value::Object(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(validator: &PatternValidator, text: &str) -> ValidationResult<()> {
        validator.validate(&Value::String(text.to_string()), "code", &Data::new())
    }

    #[test]
    fn test_delimited_pattern() {
        let validator = PatternValidator::from_delimited("/^[a-z]{2,4}$/").unwrap();

        assert_eq!(validator.pattern_string(), "^[a-z]{2,4}$");
        assert!(check(&validator, "abc").is_ok());
        assert!(check(&validator, "abcdef").is_err());
        assert!(check(&validator, "ABC").is_err());
    }

    #[test]
    fn test_delimited_pattern_flags() {
        let validator = PatternValidator::from_delimited("/^[a-z]+$/i").unwrap();
        assert!(check(&validator, "ABC").is_ok());
    }

    #[test]
    fn test_undelimited_pattern() {
        let validator = PatternValidator::from_delimited(r"^\d+$").unwrap();
        assert!(check(&validator, "123").is_ok());
        assert!(check(&validator, "12a").is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PatternValidator::from_delimited("/[unclosed/").is_err());
    }

    #[test]
    fn test_full_match() {
        let validator = PatternValidator::new(r"\d+").unwrap().full_match(true);
        assert!(check(&validator, "123").is_ok());
        assert!(check(&validator, "123abc").is_err());
    }

    #[test]
    fn test_alpha_presets() {
        let alpha = PatternValidator::alpha().unwrap();
        assert!(check(&alpha, "Zoë").is_ok());
        assert!(check(&alpha, "abc1").is_err());

        let alpha_num = PatternValidator::alpha_num().unwrap();
        assert!(check(&alpha_num, "abc1").is_ok());
        assert!(check(&alpha_num, "abc-1").is_err());

        let alpha_dash = PatternValidator::alpha_dash().unwrap();
        assert!(check(&alpha_dash, "abc-1_x").is_ok());

        let errors = check(&alpha_dash, "a b").unwrap_err();
        let error = &errors.get_field_errors("code").unwrap()[0];
        assert_eq!(error.code, "alpha_dash");
    }

    #[test]
    fn test_custom_message() {
        let validator = PatternValidator::new("^x").unwrap().message("Must start with x");
        let errors = check(&validator, "y").unwrap_err();
        assert_eq!(errors.first("code"), Some("Must start with x"));
    }
}
