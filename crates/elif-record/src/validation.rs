//! Validation orchestration for records

use crate::error::{RecordError, RecordResult};
use crate::events::ModelEvent;
use crate::model::Model;
use crate::record::Record;
use elif_validation::{Labels, Messages, RuleSet, ValidationErrors};
use std::sync::Arc;

impl<M: Model> Record<M> {
    /// Validate against the model's default rules
    pub fn validate(&mut self) -> RecordResult<bool> {
        self.validate_with(&RuleSet::new(), &Messages::new(), &Labels::new())
    }

    /// Validate with caller rules, messages and labels.
    ///
    /// Each argument that is empty falls back to the model's configured default.
    /// Returns `Ok(false)` on failure unless throw-on-validation is set, in
    /// which case the failure is returned as an error carrying the record.
    pub fn validate_with(
        &mut self,
        rules: &RuleSet,
        messages: &Messages,
        labels: &Labels,
    ) -> RecordResult<bool> {
        if self.fire(ModelEvent::Validating).is_abort() {
            tracing::debug!(table = M::table_name(), "validation aborted by listener");
            if self.settings.throw_on_validation {
                return Err(RecordError::ValidationAborted(Box::new(self.invalid_record())));
            }
            return Ok(false);
        }

        let context = Arc::clone(&self.context);
        let config = context.config();

        let rules = if rules.is_empty() { config.get_rules() } else { rules }.without_empty();

        let success = if rules.is_empty() {
            self.errors = ValidationErrors::new();
            true
        } else {
            let messages = if messages.is_empty() { config.get_custom_messages() } else { messages };
            let labels = if labels.is_empty() { config.get_custom_attributes() } else { labels };

            self.hydrate_from_input();

            let mut validator = context
                .validator_factory()
                .make(&self.attributes, &rules, messages, labels)?;
            let passed = validator.passes();

            if passed {
                if !self.errors.is_empty() {
                    self.errors = ValidationErrors::new();
                }
            } else {
                self.errors = validator.messages().clone();
                if !*config.get_standalone() {
                    if let Some(input) = context.input().filter(|input| input.has_session()) {
                        input.flash();
                    }
                }
            }

            self.validator = Some(validator);
            passed
        };

        tracing::debug!(
            table = M::table_name(),
            success,
            invalid_fields = self.errors.len(),
            "record validated"
        );

        self.fire_after(ModelEvent::Validated);

        if !success && self.settings.throw_on_validation {
            return Err(RecordError::ValidationFailed(Box::new(self.invalid_record())));
        }

        Ok(success)
    }

    /// Fill from the input source when hydration is forced, or when enabled and the record is empty
    fn hydrate_from_input(&mut self) {
        let hydrate = self.settings.force_hydrate
            || (self.settings.auto_hydrate && self.attributes.is_empty());
        if !hydrate {
            return;
        }

        let context = Arc::clone(&self.context);
        if let Some(input) = context.input() {
            let values = input.all();
            tracing::debug!(table = M::table_name(), fields = values.len(), "hydrating from input");
            self.fill(values);
        }
    }
}
