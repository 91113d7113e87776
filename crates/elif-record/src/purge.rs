//! Removal of attributes that must not reach storage

use crate::Attributes;
use std::sync::Arc;

/// Predicate over an attribute name; the attribute is kept when it returns true
pub type PurgeFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Reserved keys carried by form submissions
const RESERVED_KEYS: [&str; 2] = ["_method", "_token"];

/// Rejects `*_confirmation` fields and reserved form keys
pub fn basic_purge_filter() -> PurgeFilter {
    Arc::new(|key: &str| !key.ends_with("_confirmation") && !RESERVED_KEYS.contains(&key))
}

/// Keep the attributes every filter accepts, in their original order
pub fn purge_attributes(attributes: &Attributes, filters: &[PurgeFilter]) -> Attributes {
    let purged: Attributes = attributes
        .iter()
        .filter(|(key, _)| filters.iter().all(|filter| filter(key.as_str())))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let removed = attributes.len() - purged.len();
    if removed > 0 {
        tracing::debug!(removed, kept = purged.len(), "purged redundant attributes");
    }

    purged
}
