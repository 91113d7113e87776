//! Per-model listener registry: bound hooks plus external listeners, fired in order

use crate::events::{
    AfterCreate, AfterDelete, AfterSave, AfterUpdate, AfterValidate, BeforeCreate, BeforeDelete,
    BeforeSave, BeforeUpdate, BeforeValidate, HookOutcome, ModelEvent,
};
use crate::model::Model;
use crate::record::Record;
use std::collections::HashMap;
use std::fmt;

/// A registered event listener
pub type Listener<M> = Box<dyn Fn(&mut Record<M>) -> HookOutcome + Send + Sync>;

/// Listener registry for one model type
pub struct ModelLifecycle<M: Model> {
    listeners: HashMap<ModelEvent, Vec<Listener<M>>>,
}

impl<M: Model> ModelLifecycle<M> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }

    /// Register a listener for `event`
    pub fn listen<F>(&mut self, event: ModelEvent, listener: F) -> &mut Self
    where
        F: Fn(&mut Record<M>) -> HookOutcome + Send + Sync + 'static,
    {
        self.listeners
            .entry(event)
            .or_default()
            .push(Box::new(listener));
        self
    }

    /// Register an external `validating` listener; returning `Abort` stops validation
    pub fn validating<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&mut Record<M>) -> HookOutcome + Send + Sync + 'static,
    {
        self.listen(ModelEvent::Validating, listener)
    }

    /// Register an external `validated` listener
    pub fn validated<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&Record<M>) + Send + Sync + 'static,
    {
        self.listen(ModelEvent::Validated, move |record| {
            listener(record);
            HookOutcome::Continue
        })
    }

    /// Fire a cancelable event: listeners run in registration order until one aborts
    pub fn fire(&self, event: ModelEvent, record: &mut Record<M>) -> HookOutcome {
        let Some(listeners) = self.listeners.get(&event) else {
            return HookOutcome::Continue;
        };

        for (index, listener) in listeners.iter().enumerate() {
            if listener(record).is_abort() {
                tracing::debug!(
                    table = M::table_name(),
                    event = event.name(),
                    listener = index,
                    "lifecycle event aborted"
                );
                return HookOutcome::Abort;
            }
        }

        HookOutcome::Continue
    }

    /// Fire a non-cancelable event: every listener runs and outcomes are ignored
    pub fn fire_after(&self, event: ModelEvent, record: &mut Record<M>) {
        if let Some(listeners) = self.listeners.get(&event) {
            for listener in listeners {
                listener(record);
            }
        }
    }

    pub fn listener_count(&self, event: ModelEvent) -> usize {
        self.listeners.get(&event).map_or(0, Vec::len)
    }

    pub fn has_listeners(&self, event: ModelEvent) -> bool {
        self.listener_count(event) > 0
    }

    /// Append `other`'s listeners after this registry's own
    pub fn merge(&mut self, other: ModelLifecycle<M>) {
        for (event, listeners) in other.listeners {
            self.listeners.entry(event).or_default().extend(listeners);
        }
    }
}

/// Hook binders, available only when the model implements the capability
impl<M: Model> ModelLifecycle<M> {
    pub fn bind_before_save(&mut self) -> &mut Self
    where
        M: BeforeSave,
    {
        self.listen(ModelEvent::Saving, M::before_save)
    }

    pub fn bind_after_save(&mut self) -> &mut Self
    where
        M: AfterSave,
    {
        self.listen(ModelEvent::Saved, |record| {
            M::after_save(record);
            HookOutcome::Continue
        })
    }

    pub fn bind_before_validate(&mut self) -> &mut Self
    where
        M: BeforeValidate,
    {
        self.listen(ModelEvent::Validating, M::before_validate)
    }

    pub fn bind_after_validate(&mut self) -> &mut Self
    where
        M: AfterValidate,
    {
        self.listen(ModelEvent::Validated, |record| {
            M::after_validate(record);
            HookOutcome::Continue
        })
    }

    pub fn bind_before_create(&mut self) -> &mut Self
    where
        M: BeforeCreate,
    {
        self.listen(ModelEvent::Creating, M::before_create)
    }

    pub fn bind_after_create(&mut self) -> &mut Self
    where
        M: AfterCreate,
    {
        self.listen(ModelEvent::Created, |record| {
            M::after_create(record);
            HookOutcome::Continue
        })
    }

    pub fn bind_before_update(&mut self) -> &mut Self
    where
        M: BeforeUpdate,
    {
        self.listen(ModelEvent::Updating, M::before_update)
    }

    pub fn bind_after_update(&mut self) -> &mut Self
    where
        M: AfterUpdate,
    {
        self.listen(ModelEvent::Updated, |record| {
            M::after_update(record);
            HookOutcome::Continue
        })
    }

    pub fn bind_before_delete(&mut self) -> &mut Self
    where
        M: BeforeDelete,
    {
        self.listen(ModelEvent::Deleting, M::before_delete)
    }

    pub fn bind_after_delete(&mut self) -> &mut Self
    where
        M: AfterDelete,
    {
        self.listen(ModelEvent::Deleted, |record| {
            M::after_delete(record);
            HookOutcome::Continue
        })
    }
}

impl<M: Model> Default for ModelLifecycle<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> fmt::Debug for ModelLifecycle<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(&'static str, usize)> = ModelEvent::observable()
            .into_iter()
            .filter(|event| self.has_listeners(*event))
            .map(|event| (event.name(), self.listener_count(event)))
            .collect();

        f.debug_struct("ModelLifecycle")
            .field("table", &M::table_name())
            .field("listeners", &counts)
            .finish()
    }
}
