//! Per-candidate history recorded during one experiment run.

use super::descriptive::mean;
use serde::{Deserialize, Serialize};
use std::fmt;

/// When a candidate got mapped during a run.
///
/// Serialized as a plain integer: `-1` for initially mapped candidates,
/// `i32::MAX` for candidates left over at the end of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", from = "i64")]
pub enum MappingStep {
    /// Mapped before the first step.
    InitiallyMapped,
    /// Mapped at the given step.
    Step(u32),
    /// Never mapped.
    LeftOver,
}

impl MappingStep {
    pub const INITIALLY_MAPPED: i64 = -1;
    pub const LEFT_OVER: i64 = i32::MAX as i64;

    /// Whether the candidate took part in the automated mapping, i.e. was
    /// not mapped from the start.
    pub fn is_considered(self) -> bool {
        !matches!(self, Self::InitiallyMapped)
    }
}

impl Default for MappingStep {
    fn default() -> Self {
        Self::Step(0)
    }
}

impl From<MappingStep> for i64 {
    fn from(step: MappingStep) -> Self {
        match step {
            MappingStep::InitiallyMapped => MappingStep::INITIALLY_MAPPED,
            MappingStep::Step(n) => i64::from(n),
            MappingStep::LeftOver => MappingStep::LEFT_OVER,
        }
    }
}

impl From<i64> for MappingStep {
    fn from(value: i64) -> Self {
        if value < 0 {
            Self::InitiallyMapped
        } else if value >= Self::LEFT_OVER {
            Self::LeftOver
        } else {
            Self::Step(value as u32)
        }
    }
}

impl fmt::Display for MappingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitiallyMapped => f.write_str("initial"),
            Self::Step(n) => write!(f, "{}", n),
            Self::LeftOver => f.write_str("left over"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateStatistic {
    pub candidate_id: String,
    /// Attraction value of the chosen pair at mapping time, -1 if unknown.
    pub attraction_value: f64,
    pub mapped_cluster_id: Option<String>,
    pub expected_cluster_id: Option<String>,
    pub percentile_ranks: Vec<f64>,
    pub average_percentile_rank: f64,
    pub mapped_at_mapping_step: MappingStep,
    pub hit: bool,
}

impl CandidateStatistic {
    pub fn new(candidate_id: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            attraction_value: -1.0,
            mapped_cluster_id: None,
            expected_cluster_id: None,
            percentile_ranks: Vec::new(),
            average_percentile_rank: -1.0,
            mapped_at_mapping_step: MappingStep::default(),
            hit: false,
        }
    }

    pub fn record_percentile_rank(&mut self, rank: f64) {
        self.percentile_ranks.push(rank);
    }

    /// Samples that were actually ranked (negative samples mean the
    /// candidate had no allowed pair at that step).
    pub fn valid_percentile_ranks(&self) -> impl Iterator<Item = f64> + '_ {
        self.percentile_ranks.iter().copied().filter(|r| *r >= 0.0)
    }

    pub fn calculate_results(&mut self) {
        let valid: Vec<f64> = self.valid_percentile_ranks().collect();
        self.average_percentile_rank = mean(&valid).unwrap_or(-1.0);
    }
}
