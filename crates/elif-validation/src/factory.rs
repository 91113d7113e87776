//! Builds validators from rule sets

use crate::error::{RuleError, ValidationResult};
use crate::messages::{Labels, Messages};
use crate::rules::{RuleExpr, RuleSet};
use crate::traits::{PresenceVerifier, ValidationRule};
use crate::validator::{ParsedRule, Validator};
use crate::validators::{
    ConfirmedValidator, CustomValidator, EmailValidator, InValidator, LengthValidator,
    NumericValidator, PatternValidator, RequiredValidator, UniqueValidator,
};
use crate::Data;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Turns rule expressions into validators.
///
/// Carries the collaborators rules need at evaluation time: the presence
/// verifier behind `unique` and any custom rules registered with
/// [`extend`](Self::extend).
#[derive(Clone, Default)]
pub struct ValidatorFactory {
    presence_verifier: Option<Arc<dyn PresenceVerifier>>,
    extensions: HashMap<String, Arc<CustomValidator>>,
}

impl ValidatorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `verifier` for `unique` lookups
    pub fn with_presence_verifier(mut self, verifier: Arc<dyn PresenceVerifier>) -> Self {
        self.presence_verifier = Some(verifier);
        self
    }

    /// Register a custom rule usable by name in rule strings
    pub fn extend<F>(mut self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&Value, &str, &Data) -> ValidationResult<()> + Send + Sync + 'static,
    {
        let name = name.into();
        self.extensions
            .insert(name.clone(), Arc::new(CustomValidator::new(name, rule)));
        self
    }

    /// Register a prepared custom validator under its own name
    pub fn extend_with(mut self, validator: CustomValidator) -> Self {
        self.extensions
            .insert(validator.name().to_string(), Arc::new(validator));
        self
    }

    pub fn has_presence_verifier(&self) -> bool {
        self.presence_verifier.is_some()
    }

    /// Build a validator for `data` against `rules`
    pub fn make(
        &self,
        data: &Data,
        rules: &RuleSet,
        messages: &Messages,
        labels: &Labels,
    ) -> Result<Validator, RuleError> {
        let mut parsed = Vec::new();

        for (field, field_rules) in rules.iter() {
            let exprs: Vec<RuleExpr> = field_rules
                .to_list()
                .iter()
                .map(|expr| RuleExpr::parse(expr))
                .collect();
            let numeric_field = exprs
                .iter()
                .any(|expr| expr.name == "numeric" || expr.name == "integer");

            for expr in &exprs {
                if let Some(rule) = self.build_rule(expr, numeric_field)? {
                    parsed.push(ParsedRule::new(field.clone(), rule));
                }
            }
        }

        tracing::debug!(fields = rules.len(), rules = parsed.len(), "validator built");

        Ok(Validator::new(
            data.clone(),
            parsed,
            rules.clone(),
            messages.clone(),
            labels.clone(),
        ))
    }

    fn build_rule(
        &self,
        expr: &RuleExpr,
        numeric_field: bool,
    ) -> Result<Option<Arc<dyn ValidationRule>>, RuleError> {
        let rule: Arc<dyn ValidationRule> = match expr.name.as_str() {
            "nullable" | "sometimes" => return Ok(None),
            "required" => Arc::new(RequiredValidator::new()),
            "email" => Arc::new(EmailValidator::new()),
            "numeric" => Arc::new(NumericValidator::new()),
            "integer" => Arc::new(NumericValidator::new().integer_only(true)),
            "min" | "max" | "size" | "between" if numeric_field => {
                Arc::new(numeric_bounds(expr)?)
            }
            "min" | "max" | "size" | "between" => Arc::new(length_bounds(expr)?),
            "regex" => {
                let pattern = expr
                    .param(0)
                    .ok_or_else(|| RuleError::invalid_parameters("regex", "a pattern is required"))?;
                Arc::new(
                    PatternValidator::from_delimited(pattern)
                        .map_err(|e| RuleError::invalid_parameters("regex", e.to_string()))?,
                )
            }
            "alpha" => Arc::new(preset(PatternValidator::alpha(), "alpha")?),
            "alpha_num" => Arc::new(preset(PatternValidator::alpha_num(), "alpha_num")?),
            "alpha_dash" => Arc::new(preset(PatternValidator::alpha_dash(), "alpha_dash")?),
            "confirmed" => Arc::new(ConfirmedValidator::new()),
            "same" => {
                let other = expr
                    .param(0)
                    .ok_or_else(|| RuleError::invalid_parameters("same", "a field name is required"))?;
                Arc::new(ConfirmedValidator::same_as(other))
            }
            "in" => Arc::new(InValidator::new(expr.params.iter().cloned())),
            "unique" => {
                let verifier = self
                    .presence_verifier
                    .clone()
                    .ok_or_else(|| RuleError::MissingPresenceVerifier {
                        rule: expr.to_string(),
                    })?;
                Arc::new(UniqueValidator::from_expr(expr, verifier)?)
            }
            name => match self.extensions.get(name) {
                Some(custom) => custom.clone(),
                None => {
                    return Err(RuleError::UnknownRule {
                        rule: name.to_string(),
                    })
                }
            },
        };

        Ok(Some(rule))
    }
}

impl fmt::Debug for ValidatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorFactory")
            .field("presence_verifier", &self.presence_verifier.is_some())
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn preset(
    validator: Result<PatternValidator, regex::Error>,
    rule: &str,
) -> Result<PatternValidator, RuleError> {
    validator.map_err(|e| RuleError::invalid_parameters(rule, e.to_string()))
}

fn parse_param<T: std::str::FromStr>(expr: &RuleExpr, index: usize) -> Result<T, RuleError> {
    let raw = expr.param(index).ok_or_else(|| {
        RuleError::invalid_parameters(&expr.name, format!("parameter {} is missing", index + 1))
    })?;

    raw.parse::<T>().map_err(|_| {
        RuleError::invalid_parameters(&expr.name, format!("'{}' is not a valid number", raw))
    })
}

fn length_bounds(expr: &RuleExpr) -> Result<LengthValidator, RuleError> {
    let validator = LengthValidator::new();
    Ok(match expr.name.as_str() {
        "min" => validator.min(parse_param(expr, 0)?),
        "max" => validator.max(parse_param(expr, 0)?),
        "size" => validator.exact(parse_param(expr, 0)?),
        _ => validator.range(parse_param(expr, 0)?, parse_param(expr, 1)?),
    })
}

fn numeric_bounds(expr: &RuleExpr) -> Result<NumericValidator, RuleError> {
    let validator = NumericValidator::bounds();
    Ok(match expr.name.as_str() {
        "min" => validator.min(parse_param(expr, 0)?),
        "max" => validator.max(parse_param(expr, 0)?),
        "size" => validator.exact(parse_param(expr, 0)?),
        _ => validator.range(parse_param(expr, 0)?, parse_param(expr, 1)?),
    })
}
