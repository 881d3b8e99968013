//! Per-candidate statistical thresholding ("HugMe").
//!
//! For one candidate (or cluster) the HugMe set holds every pair whose
//! attraction value exceeds the mean plus one population standard deviation
//! of that candidate's values. When no pair clears that bar the threshold
//! falls back to the mean alone. A candidate whose HugMe set has exactly one
//! member has an unambiguous best cluster and may be mapped automatically.
//!
//! Nothing is cached: every query recomputes the slices it needs from the
//! matrix.

use super::{sorted, FilterKind, RecommendationFilter};
use crate::core::{MappingPair, Result};
use crate::matrix::AttractionMatrix;
use crate::statistics::descriptive::{mean, population_std_dev};

#[derive(Debug, Clone, Default)]
pub struct HugMeFilter {
    matrix: AttractionMatrix,
}

impl HugMeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn candidate_set(&self, candidate_id: &str) -> Vec<MappingPair> {
        hug_me_set(self.matrix.pairs_for_candidate(candidate_id))
    }
}

/// Select the pairs standing out from the rest of the slice.
pub fn hug_me_set<'a>(pairs: impl IntoIterator<Item = &'a MappingPair>) -> Vec<MappingPair> {
    let pairs: Vec<&MappingPair> = pairs.into_iter().collect();
    let values: Vec<f64> = pairs.iter().map(|p| p.attraction_value()).collect();
    let (Some(avg), Some(std_dev)) = (mean(&values), population_std_dev(&values)) else {
        return Vec::new();
    };

    let above = |threshold: f64| -> Vec<MappingPair> {
        pairs
            .iter()
            .filter(|p| p.attraction_value() > threshold)
            .map(|p| (*p).clone())
            .collect()
    };

    let strict = above(avg + std_dev);
    sorted(if strict.is_empty() { above(avg) } else { strict })
}

impl RecommendationFilter for HugMeFilter {
    fn update_mapping_pair(&mut self, pair: MappingPair) -> Result<()> {
        self.matrix.insert(pair);
        Ok(())
    }

    fn remove_candidate(&mut self, candidate_id: &str) -> Result<()> {
        self.matrix.remove_candidate(candidate_id);
        Ok(())
    }

    fn remove_cluster(&mut self, cluster_id: &str) -> Result<()> {
        self.matrix.remove_cluster(cluster_id);
        Ok(())
    }

    fn matrix(&self) -> &AttractionMatrix {
        &self.matrix
    }

    fn get_recommendations(&self) -> Vec<MappingPair> {
        sorted(
            self.matrix
                .known_candidates()
                .into_iter()
                .flat_map(|candidate| self.candidate_set(candidate))
                .collect(),
        )
    }

    fn get_recommendation_for_candidate(&self, candidate_id: &str) -> Vec<MappingPair> {
        self.candidate_set(candidate_id)
    }

    fn get_recommendation_for_cluster(&self, cluster_id: &str) -> Vec<MappingPair> {
        hug_me_set(self.matrix.pairs_for_cluster(cluster_id))
    }

    /// Only candidates with a single standout cluster are mapped.
    fn get_automatic_mappings(&self) -> Vec<MappingPair> {
        sorted(
            self.matrix
                .known_candidates()
                .into_iter()
                .filter_map(|candidate| {
                    let mut set = self.candidate_set(candidate);
                    (set.len() == 1).then(|| set.remove(0))
                })
                .collect(),
        )
    }

    fn reset(&mut self) {
        self.matrix.clear();
    }

    fn kind(&self) -> FilterKind {
        FilterKind::HugMe
    }
}
