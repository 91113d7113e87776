//! Save pipeline: validate, purge, hash, then hand the attributes to the store

use crate::error::{ModelError, RecordError, RecordResult};
use crate::events::{HookOutcome, ModelEvent};
use crate::hashing::hash_password_attributes;
use crate::model::Model;
use crate::purge::purge_attributes;
use crate::record::Record;
use chrono::Utc;
use elif_validation::{Messages, RuleSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// One-shot hook run right after the `saving` listeners
pub type BeforeSaveHook<'a, M> = Box<dyn FnOnce(&mut Record<M>) -> HookOutcome + 'a>;

/// One-shot hook run right after the `saved` listeners
pub type AfterSaveHook<'a, M> = Box<dyn FnOnce(&Record<M>) + 'a>;

/// Options passed through to the host save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// Maintain `created_at`/`updated_at` for models that use timestamps
    pub timestamps: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { timestamps: true }
    }
}

/// Arguments for a single save call
pub struct SaveArgs<'a, M: Model> {
    rules: RuleSet,
    messages: Messages,
    options: SaveOptions,
    before_save: Option<BeforeSaveHook<'a, M>>,
    after_save: Option<AfterSaveHook<'a, M>>,
}

impl<'a, M: Model> SaveArgs<'a, M> {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::new(),
            messages: Messages::new(),
            options: SaveOptions::default(),
            before_save: None,
            after_save: None,
        }
    }

    /// Rules for this save; empty means the model's defaults
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn options(mut self, options: SaveOptions) -> Self {
        self.options = options;
        self
    }

    /// Hook for this call only; returning `Abort` cancels the save
    pub fn before_save<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut Record<M>) -> HookOutcome + 'a,
    {
        self.before_save = Some(Box::new(hook));
        self
    }

    /// Hook for this call only, run once the store accepted the save
    pub fn after_save<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&Record<M>) + 'a,
    {
        self.after_save = Some(Box::new(hook));
        self
    }
}

impl<M: Model> Default for SaveArgs<'_, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> fmt::Debug for SaveArgs<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveArgs")
            .field("rules", &self.rules)
            .field("messages", &self.messages)
            .field("options", &self.options)
            .field("before_save", &self.before_save.is_some())
            .field("after_save", &self.after_save.is_some())
            .finish()
    }
}

impl<M: Model> Record<M> {
    /// Validate with the model's rules and save when valid
    pub fn save(&mut self) -> RecordResult<bool> {
        self.save_with(SaveArgs::new())
    }

    pub fn save_with(&mut self, args: SaveArgs<'_, M>) -> RecordResult<bool> {
        self.internal_save(args, false)
    }

    /// Validate, then save whatever the outcome
    pub fn force_save(&mut self) -> RecordResult<bool> {
        self.force_save_with(SaveArgs::new())
    }

    pub fn force_save_with(&mut self, args: SaveArgs<'_, M>) -> RecordResult<bool> {
        self.internal_save(args, true)
    }

    /// Save with `unique` rules rewritten to ignore this record's own row
    pub fn update_uniques(&mut self, mut args: SaveArgs<'_, M>) -> RecordResult<bool> {
        args.rules = self.build_unique_exclusion_rules(&args.rules);
        self.save_with(args)
    }

    /// Remove the record from its store
    pub fn delete(&mut self) -> RecordResult<bool> {
        if !self.exists {
            return Ok(false);
        }
        let id = self.primary_key().ok_or(ModelError::MissingPrimaryKey)?;

        if self.fire(ModelEvent::Deleting).is_abort() {
            tracing::debug!(table = M::table_name(), id = %id, "delete aborted by listener");
            return Ok(false);
        }

        let context = Arc::clone(&self.context);
        let deleted = context
            .store()
            .delete(M::table_name(), M::primary_key_name(), &id)?;

        if deleted {
            self.exists = false;
            self.fire_after(ModelEvent::Deleted);
        } else {
            tracing::debug!(table = M::table_name(), id = %id, "store removed no row");
        }
        Ok(deleted)
    }

    fn internal_save(&mut self, args: SaveArgs<'_, M>, force: bool) -> RecordResult<bool> {
        let SaveArgs {
            rules,
            messages,
            options,
            before_save,
            after_save,
        } = args;

        let valid = match self.validate_uniques(&rules, &messages) {
            Ok(valid) => valid,
            Err(RecordError::ValidationFailed(_) | RecordError::ValidationAborted(_)) if force => false,
            Err(err) => return Err(err),
        };

        if !(force || valid) {
            tracing::debug!(table = M::table_name(), "save skipped, record invalid");
            return Ok(false);
        }

        // Purged and hashed attributes only stick once the store took them
        let snapshot = self.attributes.clone();
        let result = self.perform_save(options, before_save, after_save);
        if !matches!(result, Ok(true)) {
            self.attributes = snapshot;
        }
        result
    }

    fn perform_save(
        &mut self,
        options: SaveOptions,
        before_save: Option<BeforeSaveHook<'_, M>>,
        after_save: Option<AfterSaveHook<'_, M>>,
    ) -> RecordResult<bool> {
        let context = Arc::clone(&self.context);

        if self.settings.auto_purge {
            self.attributes = purge_attributes(&self.attributes, &self.purge_filters);
        }

        if self.settings.auto_hash {
            self.attributes = hash_password_attributes(
                &self.attributes,
                &self.original,
                context.config().get_password_attributes(),
                context.hasher()?,
            )?;
        }

        if self.fire(ModelEvent::Saving).is_abort() {
            tracing::debug!(table = M::table_name(), "save aborted by listener");
            return Ok(false);
        }
        if let Some(hook) = before_save {
            if hook(self).is_abort() {
                tracing::debug!(table = M::table_name(), "save aborted by one-shot hook");
                return Ok(false);
            }
        }

        let outcome = if self.exists {
            self.perform_update(options)?
        } else {
            self.perform_insert(options)?
        };

        let Some(saved) = outcome else {
            return Ok(false);
        };

        if saved {
            self.fire_after(ModelEvent::Saved);
            if let Some(hook) = after_save {
                hook(self);
            }
            self.original = self.attributes.clone();
        }

        tracing::debug!(table = M::table_name(), saved, "record saved");
        Ok(saved)
    }

    /// `None` when an `updating` listener aborted
    fn perform_update(&mut self, options: SaveOptions) -> RecordResult<Option<bool>> {
        if self.fire(ModelEvent::Updating).is_abort() {
            return Ok(None);
        }

        let dirty = self.dirty();
        if dirty.is_empty() {
            return Ok(Some(true));
        }

        let id = self.primary_key().ok_or(ModelError::MissingPrimaryKey)?;
        if options.timestamps && M::uses_timestamps() {
            self.attributes
                .insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
        }

        let context = Arc::clone(&self.context);
        let updated = context
            .store()
            .update(M::table_name(), M::primary_key_name(), &id, &self.dirty())?;

        if updated {
            self.fire_after(ModelEvent::Updated);
        }
        Ok(Some(updated))
    }

    /// `None` when a `creating` listener aborted
    fn perform_insert(&mut self, options: SaveOptions) -> RecordResult<Option<bool>> {
        if self.fire(ModelEvent::Creating).is_abort() {
            return Ok(None);
        }

        if options.timestamps && M::uses_timestamps() {
            let now = Value::String(Utc::now().to_rfc3339());
            self.attributes.insert("created_at".to_string(), now.clone());
            self.attributes.insert("updated_at".to_string(), now);
        }

        let context = Arc::clone(&self.context);
        let id = context
            .store()
            .insert(M::table_name(), M::primary_key_name(), &self.attributes)?;

        self.attributes.insert(M::primary_key_name().to_string(), id.to_value());
        self.exists = true;

        self.fire_after(ModelEvent::Created);
        Ok(Some(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RecordContext;
    use crate::primary_key::PrimaryKey;
    use crate::store::{InMemoryStore, RecordStore};
    use serde_json::json;

    struct Note;

    impl Model for Note {
        fn table_name() -> &'static str {
            "notes"
        }

        fn uses_timestamps() -> bool {
            true
        }
    }

    fn context(store: Arc<InMemoryStore>) -> Arc<RecordContext<Note>> {
        RecordContext::builder().in_memory_store(store).build().unwrap()
    }

    #[test]
    fn test_insert_assigns_key_and_timestamps() {
        let store = Arc::new(InMemoryStore::new());
        let mut record = Record::new(context(store.clone()));
        record.set("body", "hello");

        assert!(record.save().unwrap());
        assert!(record.exists());
        assert_eq!(record.primary_key(), Some(PrimaryKey::Integer(1)));
        assert!(record.get("created_at").is_some());
        assert_eq!(record.get("created_at"), record.get("updated_at"));
        assert!(!record.is_dirty());
        assert_eq!(store.row_count("notes"), 1);
    }

    #[test]
    fn test_timestamps_can_be_disabled() {
        let mut record = Record::new(context(Arc::new(InMemoryStore::new())));
        record.set("body", "hello");

        let args = SaveArgs::new().options(SaveOptions { timestamps: false });
        assert!(record.save_with(args).unwrap());
        assert!(record.get("created_at").is_none());
        assert!(record.get("updated_at").is_none());
    }

    #[test]
    fn test_update_writes_only_dirty_attributes() {
        let store = Arc::new(InMemoryStore::new());
        let mut record = Record::new(context(store.clone()));
        record.set("body", "hello").set("pinned", false);
        assert!(record.save().unwrap());

        record.set("pinned", true);
        assert_eq!(record.dirty(), {
            let mut dirty = crate::Attributes::new();
            dirty.insert("pinned".into(), json!(true));
            dirty
        });
        assert!(record.save().unwrap());

        let row = &store.rows("notes")[0];
        assert_eq!(row.get("pinned"), Some(&json!(true)));
        assert_eq!(row.get("body"), Some(&json!("hello")));
        assert!(!record.is_dirty());
    }

    #[test]
    fn test_clean_update_succeeds_without_store_call() {
        let mut record = Record::new(context(Arc::new(InMemoryStore::new())));
        record.set("body", "hello");
        assert!(record.save().unwrap());

        let before = record.get("updated_at").cloned();
        assert!(record.save().unwrap());
        assert_eq!(record.get("updated_at").cloned(), before);
    }

    #[test]
    fn test_one_shot_hooks_run_for_single_call() {
        let mut record = Record::new(context(Arc::new(InMemoryStore::new())));
        record.set("body", "hello");

        let mut calls = Vec::new();
        let args = SaveArgs::new()
            .before_save(|record: &mut Record<Note>| {
                record.set("slug", "hello");
                HookOutcome::Continue
            })
            .after_save(|record: &Record<Note>| calls.push(record.primary_key()));
        assert!(record.save_with(args).unwrap());
        assert_eq!(calls, vec![Some(PrimaryKey::Integer(1))]);
        assert_eq!(record.get("slug"), Some(&json!("hello")));
    }

    #[test]
    fn test_one_shot_abort_cancels_save() {
        let store = Arc::new(InMemoryStore::new());
        let mut record = Record::new(context(store.clone()));
        record.set("body", "hello");

        let args = SaveArgs::new().before_save(|_: &mut Record<Note>| HookOutcome::Abort);
        assert!(!record.save_with(args).unwrap());
        assert!(!record.exists());
        assert_eq!(store.row_count("notes"), 0);
    }

    #[test]
    fn test_aborted_save_restores_attributes() {
        let store = Arc::new(InMemoryStore::new());
        let mut record = Record::new(context(store.clone()));
        record.set("body", "hello");

        let args = SaveArgs::new().before_save(|record: &mut Record<Note>| {
            record.set("slug", "hello");
            HookOutcome::Abort
        });
        assert!(!record.save_with(args).unwrap());
        assert!(record.get("slug").is_none());
        assert!(record.get("created_at").is_none());
        assert_eq!(store.row_count("notes"), 0);
    }

    #[test]
    fn test_delete_of_missing_row_keeps_record() {
        let store = Arc::new(InMemoryStore::new());
        let mut record = Record::new(context(store.clone()));
        record.set("body", "hello");
        assert!(record.save().unwrap());

        let id = record.primary_key().unwrap();
        assert!(store.delete("notes", "id", &id).unwrap());

        assert!(!record.delete().unwrap());
        assert!(record.exists());
    }

    #[test]
    fn test_delete() {
        let store = Arc::new(InMemoryStore::new());
        let mut record = Record::new(context(store.clone()));
        assert!(!record.delete().unwrap());

        record.set("body", "hello");
        assert!(record.save().unwrap());
        assert!(record.delete().unwrap());
        assert!(!record.exists());
        assert_eq!(store.row_count("notes"), 0);
    }
}
