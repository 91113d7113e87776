//! Persistence seam and an in-memory implementation

use crate::error::{ModelError, ModelResult};
use crate::primary_key::PrimaryKey;
use crate::Attributes;
use elif_validation::traits::value_to_string;
use elif_validation::PresenceVerifier;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Storage a record delegates to
pub trait RecordStore: Send + Sync {
    /// Insert a row and return its primary key
    fn insert(&self, table: &str, primary_key: &str, attributes: &Attributes) -> ModelResult<PrimaryKey>;

    /// Update the given attributes of an existing row; false when no row matched
    fn update(
        &self,
        table: &str,
        primary_key: &str,
        id: &PrimaryKey,
        attributes: &Attributes,
    ) -> ModelResult<bool>;

    /// Delete a row; false when no row matched
    fn delete(&self, table: &str, primary_key: &str, id: &PrimaryKey) -> ModelResult<bool>;

    fn find(&self, table: &str, primary_key: &str, id: &PrimaryKey) -> ModelResult<Option<Attributes>>;
}

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: IndexMap<PrimaryKey, Attributes>,
}

/// Thread-safe store keeping rows in memory, with auto-increment integer keys
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<HashMap<String, Table>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, HashMap<String, Table>> {
        // Rows are replaced whole, so a poisoned map is still consistent
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All rows of a table in insertion order
    pub fn rows(&self, table: &str) -> Vec<Attributes> {
        self.tables()
            .get(table)
            .map(|t| t.rows.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables().get(table).map_or(0, |t| t.rows.len())
    }
}

impl RecordStore for InMemoryStore {
    fn insert(&self, table: &str, primary_key: &str, attributes: &Attributes) -> ModelResult<PrimaryKey> {
        let mut tables = self.tables();
        let table_rows = tables.entry(table.to_string()).or_default();

        let id = match attributes.get(primary_key).and_then(PrimaryKey::from_value) {
            Some(id) => {
                if table_rows.rows.contains_key(&id) {
                    return Err(ModelError::InvalidKey(format!(
                        "duplicate primary key {} in table '{}'",
                        id, table
                    )));
                }
                if let PrimaryKey::Integer(n) = id {
                    table_rows.last_id = table_rows.last_id.max(n);
                }
                id
            }
            None => {
                table_rows.last_id += 1;
                PrimaryKey::Integer(table_rows.last_id)
            }
        };

        let mut row = attributes.clone();
        row.insert(primary_key.to_string(), id.to_value());
        table_rows.rows.insert(id.clone(), row);

        tracing::debug!(table, id = %id, "inserted row");
        Ok(id)
    }

    fn update(
        &self,
        table: &str,
        primary_key: &str,
        id: &PrimaryKey,
        attributes: &Attributes,
    ) -> ModelResult<bool> {
        let mut tables = self.tables();
        let Some(row) = tables.get_mut(table).and_then(|t| t.rows.get_mut(id)) else {
            return Ok(false);
        };

        for (key, value) in attributes {
            if key != primary_key {
                row.insert(key.clone(), value.clone());
            }
        }

        tracing::debug!(table, id = %id, columns = attributes.len(), "updated row");
        Ok(true)
    }

    fn delete(&self, table: &str, _primary_key: &str, id: &PrimaryKey) -> ModelResult<bool> {
        let removed = self
            .tables()
            .get_mut(table)
            .and_then(|t| t.rows.shift_remove(id))
            .is_some();

        tracing::debug!(table, id = %id, removed, "deleted row");
        Ok(removed)
    }

    fn find(&self, table: &str, _primary_key: &str, id: &PrimaryKey) -> ModelResult<Option<Attributes>> {
        Ok(self
            .tables()
            .get(table)
            .and_then(|t| t.rows.get(id))
            .cloned())
    }
}

/// `NULL` and `NOT_NULL` in extra constraints test for presence instead of equality
fn matches_constraint(row: &Attributes, column: &str, expected: &str) -> bool {
    let actual = row.get(column).filter(|v| !v.is_null());
    match expected {
        "NULL" => actual.is_none(),
        "NOT_NULL" => actual.is_some(),
        _ => actual.map_or(false, |v| value_to_string(v) == expected),
    }
}

impl PresenceVerifier for InMemoryStore {
    fn count(
        &self,
        table: &str,
        column: &str,
        value: &Value,
        excluded_id: Option<&str>,
        id_column: &str,
        extra: &[(String, String)],
    ) -> usize {
        let needle = value_to_string(value);

        self.tables().get(table).map_or(0, |t| {
            t.rows
                .values()
                .filter(|row| row.get(column).map_or(false, |v| value_to_string(v) == needle))
                .filter(|row| match excluded_id {
                    Some(excluded) => row
                        .get(id_column)
                        .map_or(true, |id| value_to_string(id) != excluded),
                    None => true,
                })
                .filter(|row| extra.iter().all(|(col, val)| matches_constraint(row, col, val)))
                .count()
        })
    }
}
