use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::placeholder::{base_key_of, split_placeholder};

/// A single `key` -> `value` pair from a values document or a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub key: String,
    pub value: String,
}

impl Replacement {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The key up to the first transformation separator.
    pub fn base_key(&self) -> &str {
        base_key_of(&self.key).unwrap_or(&self.key)
    }

    pub fn transformations(&self) -> Vec<&str> {
        split_placeholder(&self.key)
            .map(|(_, specifiers)| specifiers)
            .unwrap_or_default()
    }
}

/// Named helper tables usable by the literal naming convention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Functions {
    #[serde(rename = "APPLY_REPLACE", default, skip_serializing_if = "IndexMap::is_empty")]
    pub apply_replace: IndexMap<String, String>,
}

impl Functions {
    pub fn is_empty(&self) -> bool {
        self.apply_replace.is_empty()
    }

    /// Entries from `overrides` replace ours by key; new keys are appended in their order.
    pub fn merged_with(&self, overrides: &Functions) -> Functions {
        let mut apply_replace = self.apply_replace.clone();
        for (from, to) in &overrides.apply_replace {
            apply_replace.insert(from.clone(), to.clone());
        }
        Functions { apply_replace }
    }
}

/// Everything one substitution pass needs from its caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementSet {
    #[serde(default)]
    pub variables: Vec<Replacement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Functions::is_empty")]
    pub functions: Functions,
}

impl ReplacementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.push(Replacement::new(key, value));
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Variables keyed by name in first-seen order; a repeated key takes its last value.
    pub fn effective(&self) -> IndexMap<&str, &str> {
        let mut map = IndexMap::with_capacity(self.variables.len());
        for replacement in &self.variables {
            map.insert(replacement.key.as_str(), replacement.value.as_str());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_fields() {
        let replacement = Replacement::new("APP:gsub(-,_):toUpperCase", "my-app");
        assert_eq!(replacement.base_key(), "APP");
        assert_eq!(replacement.transformations(), vec!["gsub(-,_)", "toUpperCase"]);

        let plain = Replacement::new("APP", "my-app");
        assert_eq!(plain.base_key(), "APP");
        assert!(plain.transformations().is_empty());
    }

    #[test]
    fn test_last_value_wins() {
        let set = ReplacementSet::new().with("A", "1").with("B", "2").with("A", "3");
        let effective = set.effective();
        assert_eq!(effective.len(), 2);
        assert_eq!(effective.get("A"), Some(&"3"));
        assert_eq!(effective.get_index(0), Some((&"A", &"3")));
        assert_eq!(effective.get("C"), None);
    }

    #[test]
    fn test_functions_merge_keeps_insertion_order() {
        let mut base = Functions::default();
        base.apply_replace.insert("-".into(), "_".into());
        base.apply_replace.insert(" ".into(), "-".into());

        let mut overrides = Functions::default();
        overrides.apply_replace.insert(" ".into(), ".".into());
        overrides.apply_replace.insert("/".into(), "::".into());

        let merged = base.merged_with(&overrides);
        let entries: Vec<_> = merged
            .apply_replace
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(entries, vec![("-", "_"), (" ", "."), ("/", "::")]);
    }
}
