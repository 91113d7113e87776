//! Per-model shared state: configuration, collaborators and bound listeners

use crate::config::RecordConfig;
use crate::error::{RecordError, RecordResult};
use crate::events::{HookOutcome, ModelEvent};
use crate::hashing::{PasswordHasher, PasswordHasherFactory};
use crate::input::InputSource;
use crate::lifecycle::ModelLifecycle;
use crate::model::Model;
use crate::record::Record;
use crate::store::{InMemoryStore, RecordStore};
use elif_validation::{PresenceVerifier, ValidatorFactory};
use std::fmt;
use std::sync::Arc;

/// Everything records of one model share.
///
/// Built once per model type (or per test) and handed to every record as an
/// `Arc`, so configurations never leak between independent contexts.
pub struct RecordContext<M: Model> {
    config: RecordConfig,
    lifecycle: ModelLifecycle<M>,
    validator_factory: ValidatorFactory,
    hasher: Option<Arc<dyn PasswordHasher>>,
    input: Option<Arc<dyn InputSource>>,
    store: Arc<dyn RecordStore>,
}

impl<M: Model> RecordContext<M> {
    pub fn builder() -> RecordContextBuilder<M> {
        RecordContextBuilder::new()
    }

    pub fn config(&self) -> &RecordConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> &ModelLifecycle<M> {
        &self.lifecycle
    }

    pub fn validator_factory(&self) -> &ValidatorFactory {
        &self.validator_factory
    }

    /// Hasher for password attributes
    pub fn hasher(&self) -> RecordResult<&dyn PasswordHasher> {
        self.hasher
            .as_deref()
            .ok_or_else(|| RecordError::configuration("no password hasher is configured"))
    }

    pub fn input(&self) -> Option<&dyn InputSource> {
        self.input.as_deref()
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }
}

impl<M: Model> fmt::Debug for RecordContext<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordContext")
            .field("table", &M::table_name())
            .field("config", &self.config)
            .field("lifecycle", &self.lifecycle)
            .field("validator_factory", &self.validator_factory)
            .field("hasher", &self.hasher.as_ref().map(|h| h.hasher_name().to_string()))
            .field("input", &self.input.is_some())
            .finish()
    }
}

/// Builder for [`RecordContext`]
pub struct RecordContextBuilder<M: Model> {
    config: Option<RecordConfig>,
    listeners: ModelLifecycle<M>,
    validator_factory: Option<ValidatorFactory>,
    presence_verifier: Option<Arc<dyn PresenceVerifier>>,
    hasher: Option<Arc<dyn PasswordHasher>>,
    input: Option<Arc<dyn InputSource>>,
    store: Option<Arc<dyn RecordStore>>,
}

impl<M: Model> RecordContextBuilder<M> {
    pub fn new() -> Self {
        Self {
            config: None,
            listeners: ModelLifecycle::new(),
            validator_factory: None,
            presence_verifier: None,
            hasher: None,
            input: None,
            store: None,
        }
    }

    /// Replace the model's own default configuration
    pub fn config(mut self, config: RecordConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use an in-memory store for both persistence and `unique` lookups
    pub fn in_memory_store(mut self, store: Arc<InMemoryStore>) -> Self {
        self.presence_verifier = Some(store.clone());
        self.store = Some(store);
        self
    }

    pub fn presence_verifier(mut self, verifier: Arc<dyn PresenceVerifier>) -> Self {
        self.presence_verifier = Some(verifier);
        self
    }

    pub fn validator_factory(mut self, factory: ValidatorFactory) -> Self {
        self.validator_factory = Some(factory);
        self
    }

    pub fn hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn input(mut self, input: Arc<dyn InputSource>) -> Self {
        self.input = Some(input);
        self
    }

    /// Register an external listener; it runs after the model's own hooks
    pub fn listen<F>(mut self, event: ModelEvent, listener: F) -> Self
    where
        F: Fn(&mut Record<M>) -> HookOutcome + Send + Sync + 'static,
    {
        self.listeners.listen(event, listener);
        self
    }

    /// Register an external `validating` listener
    pub fn validating<F>(mut self, listener: F) -> Self
    where
        F: Fn(&mut Record<M>) -> HookOutcome + Send + Sync + 'static,
    {
        self.listeners.validating(listener);
        self
    }

    /// Register an external `validated` listener
    pub fn validated<F>(mut self, listener: F) -> Self
    where
        F: Fn(&Record<M>) + Send + Sync + 'static,
    {
        self.listeners.validated(listener);
        self
    }

    /// Boot the model and assemble the context
    pub fn build(self) -> RecordResult<Arc<RecordContext<M>>> {
        let store = self
            .store
            .ok_or_else(|| RecordError::configuration("a record store is required"))?;

        let mut lifecycle = ModelLifecycle::new();
        M::boot(&mut lifecycle);
        lifecycle.merge(self.listeners);

        let mut validator_factory = self.validator_factory.unwrap_or_default();
        if let Some(verifier) = self.presence_verifier {
            validator_factory = validator_factory.with_presence_verifier(verifier);
        }

        let hasher = match self.hasher {
            Some(hasher) => Some(hasher),
            None => match PasswordHasherFactory::default_hasher() {
                Ok(hasher) => Some(Arc::from(hasher)),
                Err(err) => {
                    tracing::warn!(table = M::table_name(), error = %err, "no default password hasher");
                    None
                }
            },
        };

        tracing::debug!(table = M::table_name(), ?lifecycle, "record context booted");

        Ok(Arc::new(RecordContext {
            config: self.config.unwrap_or_else(M::config),
            lifecycle,
            validator_factory,
            hasher,
            input: self.input,
            store,
        }))
    }
}

impl<M: Model> Default for RecordContextBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecordConfigBuilder;
    use elif_validation::RuleSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static BOOTS: AtomicUsize = AtomicUsize::new(0);

    struct Booted;

    impl Model for Booted {
        fn table_name() -> &'static str {
            "booted"
        }

        fn config() -> RecordConfig {
            RecordConfigBuilder::new()
                .rules(RuleSet::new().field("name", "required"))
                .build()
                .expect("Failed to build config")
        }

        fn boot(lifecycle: &mut ModelLifecycle<Self>) {
            BOOTS.fetch_add(1, Ordering::SeqCst);
            lifecycle.listen(ModelEvent::Saving, |_| HookOutcome::Continue);
        }
    }

    #[test]
    fn test_build_boots_model_once() {
        let before = BOOTS.load(Ordering::SeqCst);
        let context = RecordContext::<Booted>::builder()
            .in_memory_store(Arc::new(InMemoryStore::new()))
            .validating(|_| HookOutcome::Continue)
            .build()
            .unwrap();

        let _a = Record::new(context.clone());
        let _b = Record::new(context.clone());

        assert_eq!(BOOTS.load(Ordering::SeqCst) - before, 1);
        assert_eq!(context.lifecycle().listener_count(ModelEvent::Saving), 1);
        assert_eq!(context.lifecycle().listener_count(ModelEvent::Validating), 1);
        assert!(context.validator_factory().has_presence_verifier());
    }

    #[test]
    fn test_model_config_is_default() {
        let context = RecordContext::<Booted>::builder()
            .store(Arc::new(InMemoryStore::new()))
            .build()
            .unwrap();
        assert_eq!(context.config().get_rules().len(), 1);

        let context = RecordContext::<Booted>::builder()
            .store(Arc::new(InMemoryStore::new()))
            .config(RecordConfig::default())
            .build()
            .unwrap();
        assert!(context.config().get_rules().is_empty());
    }

    #[test]
    fn test_store_is_required() {
        let result = RecordContext::<Booted>::builder().build();
        assert!(matches!(result, Err(RecordError::Configuration { .. })));
    }
}
