//! Rule sets: field names mapped to rule expressions

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rules declared for one field, either pipe-delimited or already split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldRules {
    /// `"required|email"`
    Piped(String),
    /// `["required", "email"]`
    List(Vec<String>),
}

impl FieldRules {
    /// Split into individual rule expressions, dropping blank segments
    pub fn to_list(&self) -> Vec<String> {
        match self {
            FieldRules::Piped(rules) => rules
                .split('|')
                .filter(|rule| !rule.trim().is_empty())
                .map(|rule| rule.to_string())
                .collect(),
            FieldRules::List(rules) => rules
                .iter()
                .filter(|rule| !rule.trim().is_empty())
                .cloned()
                .collect(),
        }
    }

    /// An entry with no rule text at all
    pub fn is_empty(&self) -> bool {
        match self {
            FieldRules::Piped(rules) => rules.trim().is_empty(),
            FieldRules::List(rules) => rules.iter().all(|rule| rule.trim().is_empty()),
        }
    }
}

impl From<&str> for FieldRules {
    fn from(rules: &str) -> Self {
        FieldRules::Piped(rules.to_string())
    }
}

impl From<String> for FieldRules {
    fn from(rules: String) -> Self {
        FieldRules::Piped(rules)
    }
}

impl From<Vec<String>> for FieldRules {
    fn from(rules: Vec<String>) -> Self {
        FieldRules::List(rules)
    }
}

impl From<Vec<&str>> for FieldRules {
    fn from(rules: Vec<&str>) -> Self {
        FieldRules::List(rules.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldRules {
    fn from(rules: [&str; N]) -> Self {
        FieldRules::List(rules.iter().map(|rule| rule.to_string()).collect())
    }
}

/// Ordered mapping from field name to its rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    fields: IndexMap<String, FieldRules>,
}

impl RuleSet {
    /// Create a new empty rule set
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Add rules for a field (builder style)
    pub fn field(mut self, field: impl Into<String>, rules: impl Into<FieldRules>) -> Self {
        self.insert(field, rules);
        self
    }

    /// Add or replace rules for a field
    pub fn insert(&mut self, field: impl Into<String>, rules: impl Into<FieldRules>) {
        self.fields.insert(field.into(), rules.into());
    }

    /// Rules declared for a field
    pub fn get(&self, field: &str) -> Option<&FieldRules> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldRules)> {
        self.fields.iter()
    }

    /// Field names in declaration order
    pub fn fields(&self) -> Vec<&String> {
        self.fields.keys().collect()
    }

    /// Copy of this set without entries that carry no rule text
    pub fn without_empty(&self) -> RuleSet {
        self.fields
            .iter()
            .filter(|(_, rules)| !rules.is_empty())
            .map(|(field, rules)| (field.clone(), rules.clone()))
            .collect()
    }

    /// Copy of this set with every entry split into a list
    pub fn normalized(&self) -> RuleSet {
        self.fields
            .iter()
            .map(|(field, rules)| (field.clone(), FieldRules::List(rules.to_list())))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for RuleSet
where
    K: Into<String>,
    V: Into<FieldRules>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for (field, rules) in iter {
            set.insert(field, rules);
        }
        set
    }
}

/// A single parsed rule expression: `name[:param,param,...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleExpr {
    pub name: String,
    pub params: Vec<String>,
}

impl RuleExpr {
    /// Parse an expression such as `unique:users,email`.
    ///
    /// `regex` parameters are kept whole since patterns may contain commas.
    pub fn parse(expr: &str) -> Self {
        let expr = expr.trim();
        match expr.split_once(':') {
            None => Self {
                name: expr.to_string(),
                params: Vec::new(),
            },
            Some((name, params)) => {
                let name = name.trim().to_string();
                let params = if name == "regex" {
                    vec![params.to_string()]
                } else if params.is_empty() {
                    Vec::new()
                } else {
                    params.split(',').map(|p| p.trim().to_string()).collect()
                };
                Self { name, params }
            }
        }
    }

    /// Parameter at `index`, if supplied and non-empty
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params
            .get(index)
            .map(|p| p.as_str())
            .filter(|p| !p.is_empty())
    }
}

impl fmt::Display for RuleExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.params.join(","))
        }
    }
}
