//! # elif-record: Self-Validating Records for elif.rs
//!
//! A [`Record`] carries its attributes together with the rules they must
//! satisfy. Saving validates first, then purges confirmation fields, hashes
//! changed passwords and hands the result to a [`RecordStore`], firing the
//! model's lifecycle events along the way.
//!
//! Per-model state (default configuration, bound hooks, the validator factory,
//! the password hasher and the input source) lives in a [`RecordContext`]
//! built once and shared by every record of that model.

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod hashing;
pub mod input;
pub mod lifecycle;
pub mod model;
pub mod persistence;
pub mod primary_key;
pub mod purge;
pub mod record;
pub mod store;
pub mod unique;
pub mod validation;

/// Attribute map of a record, in insertion order
pub type Attributes = serde_json::Map<String, serde_json::Value>;

// Re-export core traits and types
pub use config::{RecordConfig, RecordConfigBuilder, RecordSettings};
pub use context::{RecordContext, RecordContextBuilder};
pub use error::{InvalidRecord, ModelError, ModelResult, RecordError, RecordResult};
pub use events::{
    AfterCreate, AfterDelete, AfterSave, AfterUpdate, AfterValidate, BeforeCreate, BeforeDelete,
    BeforeSave, BeforeUpdate, BeforeValidate, HookOutcome, ModelEvent, Phase, Radical,
};
pub use hashing::{hash_password_attributes, PasswordHasher, PasswordHasherFactory};
pub use input::{InputSource, StaticInput};
pub use lifecycle::{Listener, ModelLifecycle};
pub use model::Model;
pub use persistence::{AfterSaveHook, BeforeSaveHook, SaveArgs, SaveOptions};
pub use primary_key::PrimaryKey;
pub use purge::{basic_purge_filter, purge_attributes, PurgeFilter};
pub use record::Record;
pub use store::{InMemoryStore, RecordStore};

#[cfg(feature = "argon2")]
pub use hashing::Argon2Hasher;
#[cfg(feature = "bcrypt")]
pub use hashing::BcryptHasher;

pub use elif_validation::{
    Labels, Messages, PresenceVerifier, RuleError, RuleSet, ValidationError, ValidationErrors,
    Validator, ValidatorFactory,
};
