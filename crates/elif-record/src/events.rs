//! Lifecycle events and the hook capabilities a model can opt into

use crate::model::Model;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five operations that carry lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Radical {
    Save,
    Validate,
    Create,
    Update,
    Delete,
}

impl Radical {
    pub const ALL: [Radical; 5] = [
        Radical::Save,
        Radical::Validate,
        Radical::Create,
        Radical::Update,
        Radical::Delete,
    ];
}

/// Before ("-ing") or after ("-ed") an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

/// Named lifecycle events fired around record operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelEvent {
    Saving,
    Saved,
    Validating,
    Validated,
    Creating,
    Created,
    Updating,
    Updated,
    Deleting,
    Deleted,
}

impl ModelEvent {
    /// Event fired for `radical` in `phase`
    pub fn from_hook(radical: Radical, phase: Phase) -> Self {
        match (radical, phase) {
            (Radical::Save, Phase::Before) => ModelEvent::Saving,
            (Radical::Save, Phase::After) => ModelEvent::Saved,
            (Radical::Validate, Phase::Before) => ModelEvent::Validating,
            (Radical::Validate, Phase::After) => ModelEvent::Validated,
            (Radical::Create, Phase::Before) => ModelEvent::Creating,
            (Radical::Create, Phase::After) => ModelEvent::Created,
            (Radical::Update, Phase::Before) => ModelEvent::Updating,
            (Radical::Update, Phase::After) => ModelEvent::Updated,
            (Radical::Delete, Phase::Before) => ModelEvent::Deleting,
            (Radical::Delete, Phase::After) => ModelEvent::Deleted,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelEvent::Saving => "saving",
            ModelEvent::Saved => "saved",
            ModelEvent::Validating => "validating",
            ModelEvent::Validated => "validated",
            ModelEvent::Creating => "creating",
            ModelEvent::Created => "created",
            ModelEvent::Updating => "updating",
            ModelEvent::Updated => "updated",
            ModelEvent::Deleting => "deleting",
            ModelEvent::Deleted => "deleted",
        }
    }

    pub fn radical(&self) -> Radical {
        match self {
            ModelEvent::Saving | ModelEvent::Saved => Radical::Save,
            ModelEvent::Validating | ModelEvent::Validated => Radical::Validate,
            ModelEvent::Creating | ModelEvent::Created => Radical::Create,
            ModelEvent::Updating | ModelEvent::Updated => Radical::Update,
            ModelEvent::Deleting | ModelEvent::Deleted => Radical::Delete,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            ModelEvent::Saving
            | ModelEvent::Validating
            | ModelEvent::Creating
            | ModelEvent::Updating
            | ModelEvent::Deleting => Phase::Before,
            _ => Phase::After,
        }
    }

    /// Only "before" events can abort the operation they guard
    pub fn is_cancelable(&self) -> bool {
        self.phase() == Phase::Before
    }

    /// Every event a listener can subscribe to
    pub fn observable() -> Vec<ModelEvent> {
        Radical::ALL
            .iter()
            .flat_map(|radical| {
                [
                    ModelEvent::from_hook(*radical, Phase::Before),
                    ModelEvent::from_hook(*radical, Phase::After),
                ]
            })
            .collect()
    }
}

impl fmt::Display for ModelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a "before" listener wants to happen next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    Continue,
    Abort,
}

impl HookOutcome {
    pub fn is_abort(&self) -> bool {
        matches!(self, HookOutcome::Abort)
    }
}

impl From<bool> for HookOutcome {
    /// `true` continues, `false` aborts
    fn from(proceed: bool) -> Self {
        if proceed {
            HookOutcome::Continue
        } else {
            HookOutcome::Abort
        }
    }
}

// Hook capabilities. A model implements the ones it needs and binds them in
// `Model::boot`; the binder methods on `ModelLifecycle` only exist for models
// that implement the matching trait.

pub trait BeforeSave: Model {
    fn before_save(record: &mut Record<Self>) -> HookOutcome;
}

pub trait AfterSave: Model {
    fn after_save(record: &Record<Self>);
}

pub trait BeforeValidate: Model {
    fn before_validate(record: &mut Record<Self>) -> HookOutcome;
}

pub trait AfterValidate: Model {
    fn after_validate(record: &Record<Self>);
}

pub trait BeforeCreate: Model {
    fn before_create(record: &mut Record<Self>) -> HookOutcome;
}

pub trait AfterCreate: Model {
    fn after_create(record: &Record<Self>);
}

pub trait BeforeUpdate: Model {
    fn before_update(record: &mut Record<Self>) -> HookOutcome;
}

pub trait AfterUpdate: Model {
    fn after_update(record: &Record<Self>);
}

pub trait BeforeDelete: Model {
    fn before_delete(record: &mut Record<Self>) -> HookOutcome;
}

pub trait AfterDelete: Model {
    fn after_delete(record: &Record<Self>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_follow_radicals() {
        assert_eq!(ModelEvent::from_hook(Radical::Save, Phase::Before).name(), "saving");
        assert_eq!(ModelEvent::from_hook(Radical::Validate, Phase::After).name(), "validated");
        assert_eq!(ModelEvent::from_hook(Radical::Delete, Phase::Before), ModelEvent::Deleting);
    }

    #[test]
    fn test_observable_lists_all_ten_events() {
        let names: Vec<&str> = ModelEvent::observable().iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec![
                "saving", "saved", "validating", "validated", "creating", "created",
                "updating", "updated", "deleting", "deleted"
            ]
        );
    }

    #[test]
    fn test_event_round_trips_through_radical_and_phase() {
        for event in ModelEvent::observable() {
            assert_eq!(ModelEvent::from_hook(event.radical(), event.phase()), event);
        }
    }

    #[test]
    fn test_only_before_events_cancel() {
        assert!(ModelEvent::Creating.is_cancelable());
        assert!(!ModelEvent::Created.is_cancelable());
        assert_eq!(ModelEvent::Validated.to_string(), "validated");
    }

    #[test]
    fn test_hook_outcome_from_bool() {
        assert_eq!(HookOutcome::from(true), HookOutcome::Continue);
        assert!(HookOutcome::from(false).is_abort());
    }
}
