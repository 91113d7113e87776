//! Primary key values
//!
//! Keys are read from and written back to the attribute map, so conversion
//! to and from JSON values is the main job here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Primary key types supported by records
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimaryKey {
    /// Auto-incrementing integer primary key
    Integer(i64),
    /// UUID primary key
    Uuid(Uuid),
    /// Any other textual key
    Text(String),
}

impl std::fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimaryKey::Integer(id) => write!(f, "{}", id),
            PrimaryKey::Uuid(id) => write!(f, "{}", id),
            PrimaryKey::Text(id) => write!(f, "{}", id),
        }
    }
}

impl PrimaryKey {
    /// Read a key from an attribute value; null, empty and non-scalar values have no key
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(num) => num.as_i64().map(PrimaryKey::Integer),
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(
                Uuid::parse_str(text)
                    .map(PrimaryKey::Uuid)
                    .unwrap_or_else(|_| PrimaryKey::Text(text.clone())),
            ),
            _ => None,
        }
    }

    /// Attribute value for this key
    pub fn to_value(&self) -> Value {
        match self {
            PrimaryKey::Integer(id) => Value::from(*id),
            PrimaryKey::Uuid(id) => Value::String(id.to_string()),
            PrimaryKey::Text(id) => Value::String(id.clone()),
        }
    }

    /// Extract as i64 if this is an Integer primary key
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PrimaryKey::Integer(id) => Some(*id),
            _ => None,
        }
    }

    /// Extract as UUID if this is a UUID primary key
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            PrimaryKey::Uuid(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<i64> for PrimaryKey {
    fn from(id: i64) -> Self {
        PrimaryKey::Integer(id)
    }
}

impl From<Uuid> for PrimaryKey {
    fn from(id: Uuid) -> Self {
        PrimaryKey::Uuid(id)
    }
}

impl From<&str> for PrimaryKey {
    fn from(id: &str) -> Self {
        PrimaryKey::Text(id.to_string())
    }
}
