//! Attract functions supply the score of a candidate/cluster pair.
//!
//! How the score is computed is up to the implementation; the recommendation
//! engine only consumes the value. Implementations that learn from the
//! current mapping get notified through the `handle_*` hooks.

use crate::core::PairKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub trait AttractFunction {
    /// Attraction of the candidate towards the cluster.
    fn attraction_value(&self, candidate_id: &str, cluster_id: &str) -> f64;

    /// The candidate was mapped onto the cluster.
    fn handle_mapped(&mut self, _candidate_id: &str, _cluster_id: &str) {}

    /// The candidate was removed from the cluster.
    fn handle_unmapped(&mut self, _candidate_id: &str, _cluster_id: &str) {}

    /// Configuration block copied verbatim into experiment reports.
    fn config(&self) -> AttractFunctionConfig;
}

/// Opaque attract function configuration.
///
/// Only `kind` is interpreted; every other key is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractFunctionConfig {
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(flatten)]
    pub parameters: Map<String, Value>,
}

impl Default for AttractFunctionConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            parameters: Map::new(),
        }
    }
}

impl AttractFunctionConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            parameters: Map::new(),
        }
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }
}

fn default_kind() -> String {
    "CountAttract".to_string()
}

/// Attract function backed by a fixed table of scores.
///
/// Pairs missing from the table score `default_value`.
#[derive(Debug, Clone, Default)]
pub struct FixedAttraction {
    values: HashMap<PairKey, f64>,
    default_value: f64,
}

impl FixedAttraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, default_value: f64) -> Self {
        self.default_value = default_value;
        self
    }

    pub fn with_value(mut self, candidate_id: &str, cluster_id: &str, value: f64) -> Self {
        self.set(candidate_id, cluster_id, value);
        self
    }

    pub fn set(&mut self, candidate_id: &str, cluster_id: &str, value: f64) {
        self.values
            .insert(PairKey::new(candidate_id, cluster_id), value);
    }
}

impl AttractFunction for FixedAttraction {
    fn attraction_value(&self, candidate_id: &str, cluster_id: &str) -> f64 {
        self.values
            .get(&PairKey::new(candidate_id, cluster_id))
            .copied()
            .unwrap_or(self.default_value)
    }

    fn config(&self) -> AttractFunctionConfig {
        AttractFunctionConfig::new("FixedAttraction")
            .with_parameter("default_value", self.default_value)
            .with_parameter("entries", self.values.len())
    }
}
