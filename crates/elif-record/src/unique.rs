//! `unique` rules that ignore the record's own row

use crate::error::RecordResult;
use crate::model::Model;
use crate::record::Record;
use elif_validation::{FieldRules, Labels, Messages, RuleSet};
use std::sync::Arc;

impl<M: Model> Record<M> {
    /// Rewrite every `unique:` rule so the record's own row is excluded.
    ///
    /// An empty `rules` falls back to the model's configured rules. The table
    /// defaults to the model's table and the column to the field name; the
    /// exclusion is only appended once the record has a primary key.
    pub fn build_unique_exclusion_rules(&self, rules: &RuleSet) -> RuleSet {
        let context = Arc::clone(&self.context);
        let rules = if rules.is_empty() { context.config().get_rules() } else { rules };
        let primary_key = self.primary_key();

        rules
            .iter()
            .map(|(field, field_rules)| {
                let rewritten: Vec<String> = field_rules
                    .to_list()
                    .into_iter()
                    .map(|rule| match unique_params(&rule) {
                        Some(params) => {
                            let params: Vec<&str> = params.splitn(4, ',').map(str::trim).collect();
                            let table = params.first().copied().filter(|t| !t.is_empty()).unwrap_or(M::table_name());
                            let column = params.get(1).copied().filter(|c| !c.is_empty()).unwrap_or(field.as_str());

                            let mut unique = format!("unique:{},{}", table, column);
                            if let Some(id) = &primary_key {
                                let id_column = params
                                    .get(3)
                                    .copied()
                                    .filter(|c| !c.is_empty())
                                    .unwrap_or(M::primary_key_name());
                                unique.push_str(&format!(",{},{}", id, id_column));
                            }
                            unique
                        }
                        None => rule,
                    })
                    .collect();
                (field.clone(), FieldRules::List(rewritten))
            })
            .collect()
    }

    /// Validate with `unique` rules rewritten to ignore this record
    pub fn validate_uniques(&mut self, rules: &RuleSet, messages: &Messages) -> RecordResult<bool> {
        let rules = self.build_unique_exclusion_rules(rules);
        self.validate_with(&rules, messages, &Labels::new())
    }
}

/// Parameter text of a `unique` rule, empty for a bare `unique`
fn unique_params(rule: &str) -> Option<&str> {
    if rule == "unique" {
        return Some("");
    }
    rule.strip_prefix("unique:")
}
