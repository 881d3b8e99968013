//! Recommendations tied for the highest known attraction value.
//!
//! The filter keeps the recommendation set up to date incrementally. Each
//! updated pair is compared against [`MaxFilter::current_attraction_value`]:
//!
//! - clearly above it (by more than the delta): the pair becomes the only
//!   recommendation and the new current value
//! - within the tolerance band: the pair joins the recommendations if its
//!   value is positive
//! - anything else (below the band, or not positive): the pair leaves the
//!   recommendations if it was part of them
//!
//! The set is rebuilt from the whole matrix only when it becomes empty,
//! e.g. after the best pair was removed. Presence counters per candidate and
//! cluster make the per-candidate and per-cluster queries cheap.

use super::ref_count::RefCounter;
use super::{sorted, FilterKind, RecommendationFilter};
use crate::core::{EntityKind, Error, MappingPair, PairKey, Result};
use crate::matrix::AttractionMatrix;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct MaxFilter {
    delta: f64,
    current_attraction_value: f64,
    matrix: AttractionMatrix,
    recommendations: HashSet<PairKey>,
    candidates_in_recommendations: RefCounter,
    clusters_in_recommendations: RefCounter,
}

impl MaxFilter {
    /// Create a filter treating values closer than `delta` as equal.
    pub fn new(delta: f64) -> Result<Self> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(Error::invalid(format!(
                "attraction value delta must be a finite non-negative number, got {}",
                delta
            )));
        }
        Ok(Self {
            delta,
            current_attraction_value: f64::NEG_INFINITY,
            matrix: AttractionMatrix::new(),
            recommendations: HashSet::new(),
            candidates_in_recommendations: RefCounter::new(EntityKind::RecommendedCandidate),
            clusters_in_recommendations: RefCounter::new(EntityKind::RecommendedCluster),
        })
    }

    /// The value the tolerance band is centred on.
    pub fn current_attraction_value(&self) -> f64 {
        self.current_attraction_value
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Number of recommended pairs referencing the candidate.
    pub fn candidate_reference_count(&self, candidate_id: &str) -> usize {
        self.candidates_in_recommendations.count(candidate_id)
    }

    /// Number of recommended pairs referencing the cluster.
    pub fn cluster_reference_count(&self, cluster_id: &str) -> usize {
        self.clusters_in_recommendations.count(cluster_id)
    }

    fn update_pair_in_recommendations(&mut self, key: &PairKey) -> Result<()> {
        let Some(value) = self.matrix.get_by_key(key).map(MappingPair::attraction_value) else {
            return Ok(());
        };
        let difference = self.current_attraction_value - value;
        let contained = self.recommendations.contains(key);

        if difference < -self.delta && value > 0.0 {
            self.reset_recommendations();
            self.recommend(key);
            self.current_attraction_value = value;
        } else if difference < self.delta && value > 0.0 {
            if !contained {
                self.recommend(key);
            }
        } else if contained {
            self.evict(key)?;
        }
        Ok(())
    }

    /// Rebuild the recommendations from the full matrix.
    ///
    /// Pairs are visited by descending value so the first positive pair
    /// fixes the current value at the true maximum.
    fn update_recommendations(&mut self) -> Result<()> {
        self.reset_recommendations();
        let mut pairs: Vec<&MappingPair> = self.matrix.pairs().collect();
        pairs.sort_by(|a, b| a.cmp_by_attraction_desc(b));
        let keys: Vec<PairKey> = pairs.into_iter().map(|p| p.key().clone()).collect();

        for key in &keys {
            self.update_pair_in_recommendations(key)?;
        }
        log::debug!(
            "Recomputed max recommendations over {} pairs: {} recommended at {}",
            keys.len(),
            self.recommendations.len(),
            self.current_attraction_value
        );
        Ok(())
    }

    fn recommend(&mut self, key: &PairKey) {
        if self.recommendations.insert(key.clone()) {
            self.candidates_in_recommendations.increment(&key.candidate_id);
            self.clusters_in_recommendations.increment(&key.cluster_id);
        }
    }

    fn evict(&mut self, key: &PairKey) -> Result<()> {
        if self.recommendations.remove(key) {
            self.release(key)?;
        }
        Ok(())
    }

    fn release(&mut self, key: &PairKey) -> Result<()> {
        self.candidates_in_recommendations
            .decrement(&key.candidate_id)?;
        self.clusters_in_recommendations.decrement(&key.cluster_id)
    }

    fn reset_recommendations(&mut self) {
        self.recommendations.clear();
        self.candidates_in_recommendations.clear();
        self.clusters_in_recommendations.clear();
        self.current_attraction_value = f64::NEG_INFINITY;
    }

    fn release_removed(&mut self, removed: Vec<MappingPair>) -> Result<()> {
        for pair in &removed {
            if self.recommendations.remove(pair.key()) {
                self.release(pair.key())?;
            }
        }
        if self.recommendations.is_empty() {
            self.update_recommendations()?;
        }
        Ok(())
    }

    fn recommended_only(&self, pairs: impl Iterator<Item = MappingPair>) -> Vec<MappingPair> {
        sorted(
            pairs
                .filter(|p| self.recommendations.contains(p.key()))
                .collect(),
        )
    }
}

impl RecommendationFilter for MaxFilter {
    fn update_mapping_pair(&mut self, pair: MappingPair) -> Result<()> {
        let key = pair.key().clone();
        self.matrix.insert(pair);
        self.update_pair_in_recommendations(&key)?;

        if self.recommendations.is_empty() {
            self.update_recommendations()?;
        }
        Ok(())
    }

    fn remove_candidate(&mut self, candidate_id: &str) -> Result<()> {
        let removed = self.matrix.remove_candidate(candidate_id);
        self.release_removed(removed)
    }

    fn remove_cluster(&mut self, cluster_id: &str) -> Result<()> {
        let removed = self.matrix.remove_cluster(cluster_id);
        self.release_removed(removed)
    }

    fn matrix(&self) -> &AttractionMatrix {
        &self.matrix
    }

    fn get_recommendations(&self) -> Vec<MappingPair> {
        sorted(
            self.recommendations
                .iter()
                .filter_map(|key| self.matrix.get_by_key(key))
                .cloned()
                .collect(),
        )
    }

    fn get_recommendation_for_candidate(&self, candidate_id: &str) -> Vec<MappingPair> {
        if !self.candidates_in_recommendations.contains(candidate_id) {
            return Vec::new();
        }
        self.recommended_only(self.matrix.pairs_for_candidate(candidate_id).cloned())
    }

    fn get_recommendation_for_cluster(&self, cluster_id: &str) -> Vec<MappingPair> {
        if !self.clusters_in_recommendations.contains(cluster_id) {
            return Vec::new();
        }
        self.recommended_only(self.matrix.pairs_for_cluster(cluster_id).cloned())
    }

    /// Every pair tied for the best value is mapped.
    fn get_automatic_mappings(&self) -> Vec<MappingPair> {
        self.get_recommendations()
    }

    fn reset(&mut self) {
        self.reset_recommendations();
        self.matrix.clear();
    }

    fn kind(&self) -> FilterKind {
        FilterKind::Max
    }
}
