//! The unit of the attraction matrix: one scored (candidate, cluster) pair.

use super::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Composite key identifying a pair in the attraction matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub candidate_id: String,
    pub cluster_id: String,
}

impl PairKey {
    pub fn new(candidate_id: impl Into<String>, cluster_id: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            cluster_id: cluster_id.into(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.candidate_id, self.cluster_id)
    }
}

/// Attraction value computed for one candidate/cluster pair.
///
/// A pair is replaced as a whole whenever the attraction value is
/// recomputed, so it is never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingPair {
    #[serde(flatten)]
    key: PairKey,
    attraction_value: f64,
}

impl MappingPair {
    /// Create a pair, rejecting empty identifiers and non-finite values.
    pub fn new(
        candidate_id: impl Into<String>,
        cluster_id: impl Into<String>,
        attraction_value: f64,
    ) -> Result<Self> {
        let candidate_id = candidate_id.into();
        let cluster_id = cluster_id.into();
        validate_id(&candidate_id, "candidate")?;
        validate_id(&cluster_id, "cluster")?;
        if !attraction_value.is_finite() {
            return Err(Error::invalid(format!(
                "attraction value of ({}, {}) must be finite, got {}",
                candidate_id, cluster_id, attraction_value
            )));
        }
        Ok(Self {
            key: PairKey {
                candidate_id,
                cluster_id,
            },
            attraction_value,
        })
    }

    pub fn candidate_id(&self) -> &str {
        &self.key.candidate_id
    }

    pub fn cluster_id(&self) -> &str {
        &self.key.cluster_id
    }

    pub fn attraction_value(&self) -> f64 {
        self.attraction_value
    }

    pub fn key(&self) -> &PairKey {
        &self.key
    }

    /// Orders pairs by descending attraction value, then by key, so that
    /// sorted output is stable across runs.
    pub fn cmp_by_attraction_desc(&self, other: &Self) -> Ordering {
        other
            .attraction_value
            .total_cmp(&self.attraction_value)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl fmt::Display for MappingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {:.4}", self.key, self.attraction_value)
    }
}

/// Reject empty or whitespace-only identifiers.
pub fn validate_id(id: &str, what: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::invalid(format!("{} id must not be empty", what)));
    }
    Ok(())
}

/// Sort pairs by descending attraction value (ties by key).
pub fn sort_by_attraction(pairs: &mut [MappingPair]) {
    pairs.sort_by(MappingPair::cmp_by_attraction_desc);
}
