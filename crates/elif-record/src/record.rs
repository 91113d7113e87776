//! The self-validating record: attributes plus the state validation and saving need

use crate::config::RecordSettings;
use crate::context::RecordContext;
use crate::error::{InvalidRecord, RecordResult};
use crate::events::{HookOutcome, ModelEvent};
use crate::model::Model;
use crate::primary_key::PrimaryKey;
use crate::purge::{basic_purge_filter, PurgeFilter};
use crate::Attributes;
use elif_validation::{ValidationErrors, Validator};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// One row of a model's table, able to validate and save itself
pub struct Record<M: Model> {
    pub(crate) context: Arc<RecordContext<M>>,
    pub(crate) attributes: Attributes,
    pub(crate) original: Attributes,
    pub(crate) exists: bool,
    pub(crate) errors: ValidationErrors,
    pub(crate) validator: Option<Validator>,
    pub(crate) settings: RecordSettings,
    pub(crate) purge_filters: Vec<PurgeFilter>,
}

impl<M: Model> Record<M> {
    /// New, unsaved record with an empty error collection
    pub fn new(context: Arc<RecordContext<M>>) -> Self {
        let settings = RecordSettings::from(context.config());
        Self {
            context,
            attributes: Attributes::new(),
            original: Attributes::new(),
            exists: false,
            errors: ValidationErrors::new(),
            validator: None,
            settings,
            purge_filters: vec![basic_purge_filter()],
        }
    }

    /// New record filled through the mass-assignment rules
    pub fn with_attributes(context: Arc<RecordContext<M>>, attributes: Attributes) -> Self {
        let mut record = Self::new(context);
        record.fill(attributes);
        record
    }

    /// Load a persisted record by primary key
    pub fn find(context: Arc<RecordContext<M>>, id: impl Into<PrimaryKey>) -> RecordResult<Option<Self>> {
        let id = id.into();
        let row = context
            .store()
            .find(M::table_name(), M::primary_key_name(), &id)?;

        Ok(row.map(|attributes| {
            let mut record = Self::new(context);
            record.original = attributes.clone();
            record.attributes = attributes;
            record.exists = true;
            record
        }))
    }

    /// Assign every attribute the model allows to be mass-assigned
    pub fn fill(&mut self, attributes: Attributes) -> &mut Self {
        for (key, value) in attributes {
            if M::is_fillable(&key) {
                self.attributes.insert(key, value);
            } else {
                tracing::debug!(table = M::table_name(), attribute = %key, "skipped guarded attribute");
            }
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.attributes.shift_remove(key)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Attributes as last loaded from or written to the store
    pub fn original(&self) -> &Attributes {
        &self.original
    }

    /// Attributes that differ from the stored copy
    pub fn dirty(&self) -> Attributes {
        self.attributes
            .iter()
            .filter(|(key, value)| self.original.get(key.as_str()) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty().is_empty()
    }

    /// Whether the record has been persisted
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Current primary key, when set and non-null
    pub fn primary_key(&self) -> Option<PrimaryKey> {
        self.attributes
            .get(M::primary_key_name())
            .and_then(PrimaryKey::from_value)
    }

    /// Errors of the last validation run
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Validator built by the last validation run that had rules
    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    pub fn context(&self) -> &Arc<RecordContext<M>> {
        &self.context
    }

    pub fn settings(&self) -> &RecordSettings {
        &self.settings
    }

    pub fn throw_on_validation(&mut self, enabled: bool) -> &mut Self {
        self.settings.throw_on_validation = enabled;
        self
    }

    pub fn auto_hydrate(&mut self, enabled: bool) -> &mut Self {
        self.settings.auto_hydrate = enabled;
        self
    }

    pub fn force_hydrate(&mut self, enabled: bool) -> &mut Self {
        self.settings.force_hydrate = enabled;
        self
    }

    pub fn auto_purge(&mut self, enabled: bool) -> &mut Self {
        self.settings.auto_purge = enabled;
        self
    }

    pub fn auto_hash(&mut self, enabled: bool) -> &mut Self {
        self.settings.auto_hash = enabled;
        self
    }

    /// Add a purge filter; an attribute survives purging only if every filter accepts it
    pub fn add_purge_filter<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.purge_filters.push(Arc::new(filter));
        self
    }

    /// Fire a cancelable event through the context's listeners
    pub(crate) fn fire(&mut self, event: ModelEvent) -> HookOutcome {
        let context = Arc::clone(&self.context);
        context.lifecycle().fire(event, self)
    }

    pub(crate) fn fire_after(&mut self, event: ModelEvent) {
        let context = Arc::clone(&self.context);
        context.lifecycle().fire_after(event, self);
    }

    /// Snapshot carried by validation errors
    pub(crate) fn invalid_record(&self) -> InvalidRecord {
        InvalidRecord {
            table: M::table_name().to_string(),
            primary_key: self.primary_key(),
            attributes: self.attributes.clone(),
            errors: self.errors.clone(),
        }
    }
}

impl<M: Model> fmt::Debug for Record<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("table", &M::table_name())
            .field("attributes", &self.attributes)
            .field("exists", &self.exists)
            .field("errors", &self.errors)
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, RecordStore};
    use serde_json::json;

    struct Member;

    impl Model for Member {
        fn table_name() -> &'static str {
            "members"
        }

        fn guarded() -> &'static [&'static str] {
            &["id", "is_admin"]
        }
    }

    fn context(store: Arc<InMemoryStore>) -> Arc<RecordContext<Member>> {
        RecordContext::builder().in_memory_store(store).build().unwrap()
    }

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => Attributes::new(),
        }
    }

    #[test]
    fn test_new_record_is_empty_and_valid() {
        let record = Record::new(context(Arc::new(InMemoryStore::new())));

        assert!(record.attributes().is_empty());
        assert!(record.errors().is_empty());
        assert!(record.validator().is_none());
        assert!(!record.exists());
        assert_eq!(record.primary_key(), None);
    }

    #[test]
    fn test_fill_respects_guarded() {
        let record = Record::with_attributes(
            context(Arc::new(InMemoryStore::new())),
            attrs(json!({"id": 5, "name": "Jane", "is_admin": true})),
        );

        assert_eq!(record.get("name"), Some(&json!("Jane")));
        assert_eq!(record.get("id"), None);
        assert_eq!(record.get("is_admin"), None);
    }

    #[test]
    fn test_dirty_tracking() {
        let store = Arc::new(InMemoryStore::new());
        let id = store
            .insert("members", "id", &attrs(json!({"name": "Jane", "age": 30})))
            .unwrap();

        let mut record = Record::find(context(store), id).unwrap().unwrap();
        assert!(record.exists());
        assert!(!record.is_dirty());
        assert_eq!(record.primary_key(), Some(PrimaryKey::Integer(1)));

        record.set("age", 31);
        assert_eq!(record.dirty(), attrs(json!({"age": 31})));
    }

    #[test]
    fn test_find_missing_row() {
        let record = Record::find(context(Arc::new(InMemoryStore::new())), 42i64).unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_settings_start_from_config_and_can_be_overridden() {
        let mut record = Record::new(context(Arc::new(InMemoryStore::new())));
        assert!(!record.settings().auto_purge);

        record.auto_purge(true).auto_hash(true).throw_on_validation(true);
        assert!(record.settings().auto_purge);
        assert!(record.settings().auto_hash);
        assert!(record.settings().throw_on_validation);
    }
}
