//! Custom messages, attribute labels and placeholder substitution

use crate::error::ValidationError;
use crate::traits::value_to_string;
use indexmap::IndexMap;
use serde_json::Value;

/// Custom messages keyed by `field.rule` or `rule`
pub type Messages = IndexMap<String, String>;

/// Display labels keyed by field name
pub type Labels = IndexMap<String, String>;

/// Display name for a field: its label, or the field name with underscores as spaces
pub fn attribute_label(field: &str, labels: &Labels) -> String {
    labels
        .get(field)
        .cloned()
        .unwrap_or_else(|| field.replace('_', " "))
}

/// Final message for a failed rule.
///
/// Custom messages are looked up by `field.code` then `code`; the rule's own
/// template is the fallback. `:attribute` and every context key become
/// placeholders, and `:other` is resolved through the labels too.
pub fn format_message(error: &ValidationError, messages: &Messages, labels: &Labels) -> String {
    let template = messages
        .get(&format!("{}.{}", error.field, error.code))
        .or_else(|| messages.get(&error.code))
        .cloned()
        .unwrap_or_else(|| error.message.clone());

    let mut placeholders = vec![("attribute".to_string(), attribute_label(&error.field, labels))];
    if let Some(Value::Object(context)) = &error.context {
        for (key, value) in context {
            let replacement = if key == "other" {
                attribute_label(&value_to_string(value), labels)
            } else {
                value_to_string(value)
            };
            placeholders.push((key.clone(), replacement));
        }
    }

    // Longest keys first so `:size` cannot eat the front of `:size_unit`
    placeholders.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    placeholders
        .into_iter()
        .fold(template, |message, (key, replacement)| {
            message.replace(&format!(":{}", key), &replacement)
        })
}
