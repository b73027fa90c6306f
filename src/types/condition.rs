//! Opaque condition blocks (`operator -> key -> value`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A condition block. Only ever compared as a whole; never merged or split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(BTreeMap<String, BTreeMap<String, JsonValue>>);

impl Conditions {
    pub fn new() -> Self {
        Conditions::default()
    }

    /// Add `key: value` under `operator`, replacing any earlier value for that key.
    pub fn add(&mut self, operator: impl Into<String>, key: impl Into<String>, value: JsonValue) {
        self.0
            .entry(operator.into())
            .or_default()
            .insert(key.into(), value);
    }

    pub fn with(
        mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        value: JsonValue,
    ) -> Self {
        self.add(operator, key, value);
        self
    }

    pub fn get(&self, operator: &str, key: &str) -> Option<&JsonValue> {
        self.0.get(operator).and_then(|keys| keys.get(key))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
