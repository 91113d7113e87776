//! # elif-validation
//!
//! Rule-string validation engine for the elif framework.
//! Rules are declared the way form requests declare them
//! (`"required|email|unique:users,email"`) and evaluated against an
//! attribute map by a [`Validator`] built from a [`ValidatorFactory`].

pub mod error;
pub mod factory;
pub mod messages;
pub mod rules;
pub mod traits;
pub mod validator;
pub mod validators;

/// Attribute data under validation
pub type Data = serde_json::Map<String, serde_json::Value>;

// Re-exports for easy access
pub use error::{RuleError, ValidationError, ValidationErrors, ValidationResult};
pub use factory::ValidatorFactory;
pub use messages::{Labels, Messages};
pub use rules::{FieldRules, RuleExpr, RuleSet};
pub use traits::{PresenceVerifier, ValidationRule};
pub use validator::Validator;

// Built-in validators
pub use validators::{
    confirmed::ConfirmedValidator,
    custom::CustomValidator,
    email::EmailValidator,
    length::LengthValidator,
    membership::InValidator,
    numeric::NumericValidator,
    pattern::PatternValidator,
    required::RequiredValidator,
    unique::UniqueValidator,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_imports() {
        let _error = ValidationError::new("field", "message");
        let rules = RuleSet::new().field("email", "required|email");
        let factory = ValidatorFactory::new();

        let validator = factory.make(&Data::new(), &rules, &Messages::new(), &Labels::new());
        assert!(validator.is_ok());
    }
}
