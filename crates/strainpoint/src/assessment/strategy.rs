use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::domain::{CriterionKey, Severity};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategySet {
    pub immediate: Vec<String>,
    pub structural: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub archetypal: Vec<String>,
}

/// Guidance prose keyed by criterion, with a mandatory `generic` bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "K: CriterionKey")]
pub struct StrategyTable<K> {
    pub generic: StrategySet,
    #[serde(default)]
    pub criteria: BTreeMap<K, StrategySet>,
}

/// Strategies attached to one weakest link in the final report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyGuidance {
    pub immediate: Vec<String>,
    pub structural: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub archetypal: Vec<String>,
    pub severity: Severity,
    pub generic: bool,
}

impl<K: CriterionKey> StrategyTable<K> {
    pub fn new(generic: StrategySet) -> Self {
        Self {
            generic,
            criteria: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: K, strategies: StrategySet) -> Self {
        self.criteria.insert(key, strategies);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Never fails: unknown keys resolve to the generic bucket.
    pub fn lookup(&self, key: K) -> (&StrategySet, bool) {
        match self.criteria.get(&key) {
            Some(set) => (set, false),
            None => (&self.generic, true),
        }
    }

    pub fn guidance(&self, key: K, severity: Severity) -> StrategyGuidance {
        let (set, generic) = self.lookup(key);
        StrategyGuidance {
            immediate: set.immediate.clone(),
            structural: set.structural.clone(),
            archetypal: set.archetypal.clone(),
            severity,
            generic,
        }
    }

    /// Keys that would fall back to the generic bucket.
    pub fn missing_keys(&self) -> Vec<K> {
        K::ALL
            .iter()
            .copied()
            .filter(|key| !self.criteria.contains_key(key))
            .collect()
    }
}
