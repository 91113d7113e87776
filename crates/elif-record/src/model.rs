//! Core Model Trait - type-level metadata for self-validating records
//!
//! A model is a marker type describing a table: its name, primary key,
//! timestamp behaviour, mass-assignment policy, default configuration and the
//! lifecycle hooks bound when its record context boots.

use crate::config::RecordConfig;
use crate::lifecycle::ModelLifecycle;

/// Type-level description of a record's table
pub trait Model: Sized + Send + Sync + 'static {
    /// Table name for this model
    fn table_name() -> &'static str;

    /// Primary key column name
    fn primary_key_name() -> &'static str {
        "id"
    }

    /// Check if this model uses timestamps (created_at, updated_at)
    fn uses_timestamps() -> bool {
        false
    }

    /// Attributes accepted by `fill`; empty means every attribute not guarded
    fn fillable() -> &'static [&'static str] {
        &[]
    }

    /// Attributes `fill` never assigns
    fn guarded() -> &'static [&'static str] {
        &[]
    }

    /// Default rules, messages, labels and toggles for records of this type
    fn config() -> RecordConfig {
        RecordConfig::default()
    }

    /// Bind lifecycle hooks; runs once per record context
    fn boot(_lifecycle: &mut ModelLifecycle<Self>) {}

    /// Whether `fill` may assign `key`
    fn is_fillable(key: &str) -> bool {
        if Self::guarded().contains(&key) || Self::guarded() == ["*"] {
            return false;
        }
        Self::fillable().is_empty() || Self::fillable().contains(&key)
    }
}
