//! Error types for self-validating records
//!
//! `ModelError` covers failures reported by the persistence layer, while
//! `RecordError` is what record operations return: validation outcomes raised
//! in throw mode, rule construction problems, hashing and configuration errors.

use crate::primary_key::PrimaryKey;
use crate::Attributes;
use elif_validation::{RuleError, ValidationErrors};
use std::fmt;
use thiserror::Error;

/// Result type alias for persistence operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Result type alias for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors reported by a record store
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Storage backend failure
    Database(String),
    /// Record not found in table
    NotFound(String),
    /// Primary key is missing or invalid
    MissingPrimaryKey,
    /// Serialization/deserialization error
    Serialization(String),
    /// Invalid key error
    InvalidKey(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Database(msg) => write!(f, "Database error: {}", msg),
            ModelError::NotFound(table) => write!(f, "Record not found in table '{}'", table),
            ModelError::MissingPrimaryKey => write!(f, "Primary key is missing or invalid"),
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ModelError::InvalidKey(msg) => write!(f, "Invalid key error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

/// Snapshot of a record that did not pass validation
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidRecord {
    pub table: String,
    pub primary_key: Option<PrimaryKey>,
    pub attributes: Attributes,
    pub errors: ValidationErrors,
}

impl fmt::Display for InvalidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.primary_key {
            Some(id) => write!(f, "{} #{}", self.table, id)?,
            None => write!(f, "new {} record", self.table)?,
        }
        if !self.errors.is_empty() {
            write!(f, " ({} field(s) invalid)", self.errors.len())?;
        }
        Ok(())
    }
}

/// Errors returned by record operations
#[derive(Debug, Error)]
pub enum RecordError {
    /// A `validating` listener aborted the run
    #[error("Validation aborted for {0}")]
    ValidationAborted(Box<InvalidRecord>),

    /// Rules ran and at least one failed
    #[error("Validation failed for {0}")]
    ValidationFailed(Box<InvalidRecord>),

    #[error("Invalid rule definition: {0}")]
    Rule(#[from] RuleError),

    #[error("Password hashing failed: {message}")]
    Hashing { message: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl RecordError {
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The record snapshot carried by validation errors
    pub fn invalid_record(&self) -> Option<&InvalidRecord> {
        match self {
            Self::ValidationAborted(record) | Self::ValidationFailed(record) => Some(record),
            _ => None,
        }
    }

    /// Validation messages carried by a failed validation
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        self.invalid_record().map(|record| &record.errors)
    }
}
