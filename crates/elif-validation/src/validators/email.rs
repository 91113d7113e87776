//! `email` rule

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;
use crate::Data;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const WITH_TLD: &str = r"^[a-zA-Z0-9]([a-zA-Z0-9._%+-]*[a-zA-Z0-9])?@[a-zA-Z0-9]([a-zA-Z0-9.-]*[a-zA-Z0-9])?\.[a-zA-Z]{2,}$";
const LOCAL_HOST: &str = r"^[a-zA-Z0-9]([a-zA-Z0-9._%+-]*[a-zA-Z0-9])?@[a-zA-Z0-9]([a-zA-Z0-9.-]*[a-zA-Z0-9])?$";

static WITH_TLD_RE: OnceLock<Option<Regex>> = OnceLock::new();
static LOCAL_HOST_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// Checks that a string looks like a deliverable address
#[derive(Debug, Clone, Default)]
pub struct EmailValidator {
    message: Option<String>,
    allow_local: bool,
}

impl EmailValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Accept domains without a top-level part, such as `admin@localhost`
    pub fn allow_local(mut self) -> Self {
        self.allow_local = true;
        self
    }

    fn is_address(&self, email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        // RFC 5321 limits
        if local.is_empty() || local.len() > 64 || domain.is_empty() || domain.len() > 255 {
            return false;
        }
        if domain.contains('@') || email.contains("..") {
            return false;
        }

        let pattern = if self.allow_local {
            compiled(&LOCAL_HOST_RE, LOCAL_HOST)
        } else {
            compiled(&WITH_TLD_RE, WITH_TLD)
        };
        pattern.map_or(false, |re| re.is_match(email))
    }
}

impl ValidationRule for EmailValidator {
    fn validate(&self, value: &Value, field: &str, _data: &Data) -> ValidationResult<()> {
        if value.as_str().map_or(false, |email| self.is_address(email)) {
            return Ok(());
        }

        let message = self
            .message
            .as_deref()
            .unwrap_or("The :attribute must be a valid email address.");
        Err(ValidationError::with_code(field, message, "email").into())
    }

    fn rule_name(&self) -> &str {
        "email"
    }

    fn parameters(&self) -> Option<Value> {
        Some(serde_json::json!({ "allow_local": self.allow_local }))
    }
}
