//! Record configuration types and builders

use elif_validation::{Labels, Messages, RuleSet};
use serde::{Deserialize, Serialize};
use service_builder::builder;

/// Type-level defaults for a model's records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[builder]
pub struct RecordConfig {
    /// Rules used when a call supplies none
    #[builder(default = "RuleSet::new()", getter)]
    pub rules: RuleSet,

    /// Messages keyed by `field.rule` or `rule`
    #[builder(default = "Messages::new()", getter)]
    pub custom_messages: Messages,

    /// Display labels keyed by field name
    #[builder(default = "Labels::new()", getter)]
    pub custom_attributes: Labels,

    /// Attributes hashed before save
    #[builder(default = "vec![\"password\".to_string()]", getter)]
    pub password_attributes: Vec<String>,

    /// Return validation errors instead of `Ok(false)`
    #[builder(default = "false", getter)]
    pub throw_on_validation: bool,

    /// Fill empty records from the input source before validating
    #[builder(default = "false", getter)]
    pub auto_hydrate_from_input: bool,

    /// Always fill from the input source before validating
    #[builder(default = "false", getter)]
    pub force_hydration_from_input: bool,

    /// Drop confirmation fields and framework markers before save
    #[builder(default = "false", getter)]
    pub auto_purge_redundant_attributes: bool,

    /// Hash changed password attributes before save
    #[builder(default = "false", getter)]
    pub auto_hash_password_attributes: bool,

    /// Running outside a request: never touch the input session
    #[builder(default = "false", getter)]
    pub standalone: bool,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            rules: RuleSet::new(),
            custom_messages: Messages::new(),
            custom_attributes: Labels::new(),
            password_attributes: vec!["password".to_string()],
            throw_on_validation: false,
            auto_hydrate_from_input: false,
            force_hydration_from_input: false,
            auto_purge_redundant_attributes: false,
            auto_hash_password_attributes: false,
            standalone: false,
        }
    }
}

impl RecordConfigBuilder {
    /// Purge and hash on save, the usual setup for account-style models
    pub fn secure() -> Self {
        RecordConfigBuilder::new()
            .auto_purge_redundant_attributes(true)
            .auto_hash_password_attributes(true)
    }

    /// Detached from any request: no input session, errors returned instead of `Ok(false)`
    pub fn detached() -> Self {
        RecordConfigBuilder::new()
            .standalone(true)
            .throw_on_validation(true)
    }
}

/// Per-record toggles, copied from the config when the record is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSettings {
    pub throw_on_validation: bool,
    pub auto_hydrate: bool,
    pub force_hydrate: bool,
    pub auto_purge: bool,
    pub auto_hash: bool,
}

impl From<&RecordConfig> for RecordSettings {
    fn from(config: &RecordConfig) -> Self {
        Self {
            throw_on_validation: *config.get_throw_on_validation(),
            auto_hydrate: *config.get_auto_hydrate_from_input(),
            force_hydrate: *config.get_force_hydration_from_input(),
            auto_purge: *config.get_auto_purge_redundant_attributes(),
            auto_hash: *config.get_auto_hash_password_attributes(),
        }
    }
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self::from(&RecordConfig::default())
    }
}
