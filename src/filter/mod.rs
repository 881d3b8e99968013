//! Recommendation filters.
//!
//! A filter owns an [`AttractionMatrix`] and decides which of its pairs are
//! recommended to the user and which are safe to apply without asking.
//!
//! - [`MaxFilter`]: every pair within a tolerance band of the global maximum
//! - [`HugMeFilter`]: per-candidate thresholding at mean + standard deviation

pub mod hug_me;
pub mod max_filter;
pub mod ref_count;
pub mod replay;

pub use hug_me::{hug_me_set, HugMeFilter};
pub use max_filter::MaxFilter;
pub use ref_count::RefCounter;
pub use replay::{load_events, parse_events, replay, FilterEvent};

use crate::core::{MappingPair, Result};
use crate::matrix::AttractionMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default tolerance when comparing attraction values.
pub const ATTRACTION_VALUE_DELTA: f64 = 0.001;

/// Common contract of the recommendation strategies.
///
/// Mutating operations return `Result` because they maintain bookkeeping
/// whose corruption must surface as an error. Query results are sorted by
/// descending attraction value.
pub trait RecommendationFilter: fmt::Debug {
    /// Insert or overwrite a pair and update the recommendations.
    fn update_mapping_pair(&mut self, pair: MappingPair) -> Result<()>;

    /// Drop every pair of the candidate from the matrix and recommendations.
    fn remove_candidate(&mut self, candidate_id: &str) -> Result<()>;

    /// Drop every pair of the cluster from the matrix and recommendations.
    fn remove_cluster(&mut self, cluster_id: &str) -> Result<()>;

    /// The underlying matrix.
    fn matrix(&self) -> &AttractionMatrix;

    fn get_mapping_pair(&self, candidate_id: &str, cluster_id: &str) -> Option<&MappingPair> {
        self.matrix().get(candidate_id, cluster_id)
    }

    /// All stored pairs.
    fn get_mapping_pairs(&self) -> Vec<MappingPair> {
        sorted(self.matrix().pairs().cloned().collect())
    }

    fn get_recommendations(&self) -> Vec<MappingPair>;

    fn get_recommendation_for_candidate(&self, candidate_id: &str) -> Vec<MappingPair>;

    fn get_recommendation_for_cluster(&self, cluster_id: &str) -> Vec<MappingPair>;

    /// Recommendations the strategy considers safe to apply automatically.
    fn get_automatic_mappings(&self) -> Vec<MappingPair>;

    /// Forget all pairs, known ids and recommendations.
    fn reset(&mut self);

    fn kind(&self) -> FilterKind;
}

/// Available recommendation strategies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    #[default]
    Max,
    HugMe,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => f.write_str("max"),
            Self::HugMe => f.write_str("hug-me"),
        }
    }
}

/// Build the filter for `kind`. `delta` is only used by [`MaxFilter`].
pub fn create_filter(kind: FilterKind, delta: f64) -> Result<Box<dyn RecommendationFilter>> {
    Ok(match kind {
        FilterKind::Max => Box::new(MaxFilter::new(delta)?),
        FilterKind::HugMe => Box::new(HugMeFilter::new()),
    })
}

pub(crate) fn sorted(mut pairs: Vec<MappingPair>) -> Vec<MappingPair> {
    crate::core::sort_by_attraction(&mut pairs);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_filter_matches_kind() {
        for kind in [FilterKind::Max, FilterKind::HugMe] {
            let filter = create_filter(kind, ATTRACTION_VALUE_DELTA).unwrap();
            assert_eq!(filter.kind(), kind);
        }
    }

    #[test]
    fn test_create_max_filter_rejects_negative_delta() {
        assert!(create_filter(FilterKind::Max, -0.1).is_err());
    }

    #[test]
    fn test_filter_kind_serde_names() {
        let json = serde_json::to_string(&FilterKind::HugMe).unwrap();
        assert_eq!(json, "\"hug-me\"");
    }
}
