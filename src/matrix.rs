//! Sparse attraction matrix.
//!
//! Stores the latest [`MappingPair`] for every (candidate, cluster) key and
//! keeps two secondary indexes so that all pairs of one candidate or one
//! cluster can be visited without scanning the whole matrix. The keys of
//! the indexes double as the sets of known candidate and cluster ids: an id
//! becomes known with its first pair and is forgotten only when it is
//! removed explicitly.

use crate::core::{MappingPair, PairKey};
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct AttractionMatrix {
    pairs: HashMap<PairKey, MappingPair>,
    clusters_by_candidate: HashMap<String, HashSet<String>>,
    candidates_by_cluster: HashMap<String, HashSet<String>>,
}

impl AttractionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a pair, returning the replaced one.
    pub fn insert(&mut self, pair: MappingPair) -> Option<MappingPair> {
        self.clusters_by_candidate
            .entry(pair.candidate_id().to_string())
            .or_default()
            .insert(pair.cluster_id().to_string());
        self.candidates_by_cluster
            .entry(pair.cluster_id().to_string())
            .or_default()
            .insert(pair.candidate_id().to_string());
        self.pairs.insert(pair.key().clone(), pair)
    }

    pub fn get(&self, candidate_id: &str, cluster_id: &str) -> Option<&MappingPair> {
        self.pairs.get(&PairKey::new(candidate_id, cluster_id))
    }

    pub fn get_by_key(&self, key: &PairKey) -> Option<&MappingPair> {
        self.pairs.get(key)
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.pairs.contains_key(key)
    }

    /// Remove a candidate and every pair referencing it.
    pub fn remove_candidate(&mut self, candidate_id: &str) -> Vec<MappingPair> {
        let Some(clusters) = self.clusters_by_candidate.remove(candidate_id) else {
            return Vec::new();
        };
        clusters
            .into_iter()
            .filter_map(|cluster_id| {
                if let Some(candidates) = self.candidates_by_cluster.get_mut(&cluster_id) {
                    candidates.remove(candidate_id);
                }
                self.pairs.remove(&PairKey::new(candidate_id, cluster_id))
            })
            .collect()
    }

    /// Remove a cluster and every pair referencing it.
    pub fn remove_cluster(&mut self, cluster_id: &str) -> Vec<MappingPair> {
        let Some(candidates) = self.candidates_by_cluster.remove(cluster_id) else {
            return Vec::new();
        };
        candidates
            .into_iter()
            .filter_map(|candidate_id| {
                if let Some(clusters) = self.clusters_by_candidate.get_mut(&candidate_id) {
                    clusters.remove(cluster_id);
                }
                self.pairs.remove(&PairKey::new(candidate_id, cluster_id))
            })
            .collect()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &MappingPair> {
        self.pairs.values()
    }

    pub fn pairs_for_candidate<'a>(
        &'a self,
        candidate_id: &'a str,
    ) -> impl Iterator<Item = &'a MappingPair> + 'a {
        self.clusters_by_candidate
            .get(candidate_id)
            .into_iter()
            .flatten()
            .filter_map(move |cluster_id| self.get(candidate_id, cluster_id))
    }

    pub fn pairs_for_cluster<'a>(
        &'a self,
        cluster_id: &'a str,
    ) -> impl Iterator<Item = &'a MappingPair> + 'a {
        self.candidates_by_cluster
            .get(cluster_id)
            .into_iter()
            .flatten()
            .filter_map(move |candidate_id| self.get(candidate_id, cluster_id))
    }

    /// Known candidate ids in lexical order.
    pub fn known_candidates(&self) -> BTreeSet<&str> {
        self.clusters_by_candidate.keys().map(String::as_str).collect()
    }

    /// Known cluster ids in lexical order.
    pub fn known_clusters(&self) -> BTreeSet<&str> {
        self.candidates_by_cluster.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
        self.clusters_by_candidate.clear();
        self.candidates_by_cluster.clear();
    }
}
