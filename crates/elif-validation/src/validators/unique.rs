//! Uniqueness validator backed by a [`PresenceVerifier`]

use crate::error::{RuleError, ValidationError, ValidationResult};
use crate::rules::RuleExpr;
use crate::traits::{PresenceVerifier, ValidationRule};
use crate::Data;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Validator for `unique:<table>[,<column>[,<except_id>[,<id_column>[,<col>,<val>...]]]]`
#[derive(Clone)]
pub struct UniqueValidator {
    pub table: String,
    /// Column to look in; defaults to the field under validation
    pub column: Option<String>,
    /// Row id to ignore, so a record does not collide with itself
    pub except_id: Option<String>,
    pub id_column: String,
    /// Additional `column = value` constraints
    pub extra: Vec<(String, String)>,
    /// Custom error message
    pub message: Option<String>,
    verifier: Arc<dyn PresenceVerifier>,
}

impl UniqueValidator {
    pub fn new(table: impl Into<String>, verifier: Arc<dyn PresenceVerifier>) -> Self {
        Self {
            table: table.into(),
            column: None,
            except_id: None,
            id_column: "id".to_string(),
            extra: Vec::new(),
            message: None,
            verifier,
        }
    }

    /// Build from a parsed `unique` expression
    pub fn from_expr(expr: &RuleExpr, verifier: Arc<dyn PresenceVerifier>) -> Result<Self, RuleError> {
        let table = expr
            .param(0)
            .ok_or_else(|| RuleError::invalid_parameters("unique", "a table name is required"))?;

        let mut validator = Self::new(table, verifier);
        validator.column = expr.param(1).map(String::from);
        validator.except_id = expr
            .param(2)
            .filter(|id| !id.eq_ignore_ascii_case("null"))
            .map(String::from);
        if let Some(id_column) = expr.param(3) {
            validator.id_column = id_column.to_string();
        }

        let extra = expr.params.get(4..).unwrap_or_default();
        if extra.len() % 2 != 0 {
            return Err(RuleError::invalid_parameters(
                "unique",
                "extra constraints must come in column,value pairs",
            ));
        }
        validator.extra = extra
            .chunks(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();

        Ok(validator)
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Ignore the row whose `id_column` equals `id`
    pub fn except(mut self, id: impl Into<String>, id_column: impl Into<String>) -> Self {
        self.except_id = Some(id.into());
        self.id_column = id_column.into();
        self
    }

    /// Set custom error message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Debug for UniqueValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueValidator")
            .field("table", &self.table)
            .field("column", &self.column)
            .field("except_id", &self.except_id)
            .field("id_column", &self.id_column)
            .field("extra", &self.extra)
            .finish()
    }
}

impl ValidationRule for UniqueValidator {
    fn validate(&self, value: &Value, field: &str, _data: &Data) -> ValidationResult<()> {
        let column = self.column.as_deref().unwrap_or(field);
        let count = self.verifier.count(
            &self.table,
            column,
            value,
            self.except_id.as_deref(),
            &self.id_column,
            &self.extra,
        );

        tracing::debug!(table = %self.table, column, count, "unique lookup");

        if count == 0 {
            return Ok(());
        }

        let message = self
            .message
            .clone()
            .unwrap_or_else(|| "The :attribute has already been taken.".to_string());

        Err(ValidationError::with_code(field, message, "unique").into())
    }

    fn rule_name(&self) -> &str {
        "unique"
    }

    fn parameters(&self) -> Option<Value> {
        Some(serde_json::json!({
            "table": self.table,
            "column": self.column,
            "except_id": self.except_id,
            "id_column": self.id_column,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::value_to_string;
    use serde_json::json;

    /// Rows as (table, id, column, value)
    struct Rows(Vec<(&'static str, &'static str, &'static str, &'static str)>);

    impl PresenceVerifier for Rows {
        fn count(
            &self,
            table: &str,
            column: &str,
            value: &Value,
            excluded_id: Option<&str>,
            _id_column: &str,
            _extra: &[(String, String)],
        ) -> usize {
            let needle = value_to_string(value);
            self.0
                .iter()
                .filter(|(t, id, c, v)| {
                    *t == table && *c == column && *v == needle && Some(*id) != excluded_id
                })
                .count()
        }
    }

    fn verifier() -> Arc<dyn PresenceVerifier> {
        Arc::new(Rows(vec![("users", "7", "email", "taken@example.com")]))
    }

    #[test]
    fn test_unique_detects_taken_value() {
        let expr = RuleExpr::parse("unique:users");
        let validator = UniqueValidator::from_expr(&expr, verifier()).unwrap();

        let errors = validator
            .validate(&json!("taken@example.com"), "email", &Data::new())
            .unwrap_err();
        assert_eq!(errors.get_field_errors("email").unwrap()[0].code, "unique");
        assert!(validator.validate(&json!("free@example.com"), "email", &Data::new()).is_ok());
    }

    #[test]
    fn test_unique_ignores_excluded_row() {
        let expr = RuleExpr::parse("unique:users,email,7,id");
        let validator = UniqueValidator::from_expr(&expr, verifier()).unwrap();

        assert_eq!(validator.except_id.as_deref(), Some("7"));
        assert!(validator.validate(&json!("taken@example.com"), "email", &Data::new()).is_ok());
    }

    #[test]
    fn test_unique_null_except_means_none() {
        let expr = RuleExpr::parse("unique:users,email,NULL,id");
        let validator = UniqueValidator::from_expr(&expr, verifier()).unwrap();
        assert!(validator.except_id.is_none());
    }

    #[test]
    fn test_unique_parameter_errors() {
        assert!(UniqueValidator::from_expr(&RuleExpr::parse("unique"), verifier()).is_err());
        assert!(UniqueValidator::from_expr(&RuleExpr::parse("unique:users,email,1,id,team"), verifier()).is_err());

        let validator =
            UniqueValidator::from_expr(&RuleExpr::parse("unique:users,email,NULL,id,team_id,3"), verifier())
                .unwrap();
        assert_eq!(validator.extra, vec![("team_id".to_string(), "3".to_string())]);
    }
}
