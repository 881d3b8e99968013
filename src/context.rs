//! Collaborators supplied by the reflexion engine.
//!
//! The statistics engine needs to know where a candidate is currently
//! mapped, where the oracle expects it, and whether a mapping counts as a
//! hit. [`MappingSource`] abstracts those lookups; [`StaticMappings`] is a
//! plain in-memory implementation for tests and offline replays.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub trait MappingSource {
    /// Cluster the candidate is currently mapped to.
    fn maps_to(&self, candidate_id: &str) -> Option<String>;

    /// Cluster the oracle expects the candidate to be mapped to.
    fn expected_cluster(&self, candidate_id: &str) -> Option<String>;

    /// Whether mapping the candidate onto the cluster is correct.
    fn is_hit(&self, candidate_id: &str, cluster_id: &str) -> bool {
        self.expected_cluster(candidate_id).as_deref() == Some(cluster_id)
    }

    /// Every cluster a mapping of the candidate would count as a hit for.
    fn allowed_clusters(&self, candidate_id: &str) -> HashSet<String> {
        self.expected_cluster(candidate_id).into_iter().collect()
    }
}

/// Seeds and iteration count of an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExperimentContext {
    pub master_seed: i64,
    pub current_seed: i64,
    pub iterations: u32,
}

impl ExperimentContext {
    pub fn new(master_seed: i64, current_seed: i64) -> Self {
        Self {
            master_seed,
            current_seed,
            iterations: 1,
        }
    }
}

/// In-memory current and oracle mappings.
///
/// Aliases let a cluster stand in for the expected one, e.g. a parent
/// cluster that subsumes the oracle's target.
#[derive(Debug, Clone, Default)]
pub struct StaticMappings {
    current: HashMap<String, String>,
    oracle: HashMap<String, String>,
    aliases: HashMap<String, HashSet<String>>,
}

impl StaticMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(mut self, candidate_id: &str, cluster_id: &str) -> Self {
        self.map(candidate_id, cluster_id);
        self
    }

    pub fn with_expected(mut self, candidate_id: &str, cluster_id: &str) -> Self {
        self.oracle
            .insert(candidate_id.to_string(), cluster_id.to_string());
        self
    }

    /// Accept `alias` wherever `cluster_id` is expected.
    pub fn with_alias(mut self, cluster_id: &str, alias: &str) -> Self {
        self.aliases
            .entry(cluster_id.to_string())
            .or_default()
            .insert(alias.to_string());
        self
    }

    pub fn map(&mut self, candidate_id: &str, cluster_id: &str) {
        self.current
            .insert(candidate_id.to_string(), cluster_id.to_string());
    }

    pub fn unmap(&mut self, candidate_id: &str) -> Option<String> {
        self.current.remove(candidate_id)
    }
}

impl MappingSource for StaticMappings {
    fn maps_to(&self, candidate_id: &str) -> Option<String> {
        self.current.get(candidate_id).cloned()
    }

    fn expected_cluster(&self, candidate_id: &str) -> Option<String> {
        self.oracle.get(candidate_id).cloned()
    }

    fn is_hit(&self, candidate_id: &str, cluster_id: &str) -> bool {
        let Some(expected) = self.oracle.get(candidate_id) else {
            return false;
        };
        expected == cluster_id
            || self
                .aliases
                .get(expected)
                .is_some_and(|aliases| aliases.contains(cluster_id))
    }

    fn allowed_clusters(&self, candidate_id: &str) -> HashSet<String> {
        let Some(expected) = self.oracle.get(candidate_id) else {
            return HashSet::new();
        };
        let mut allowed = self.aliases.get(expected).cloned().unwrap_or_default();
        allowed.insert(expected.clone());
        allowed
    }
}
