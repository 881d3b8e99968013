//! Percentile rank of a candidate among the pairs pointing to its correct
//! clusters.
//!
//! Only pairs whose cluster is allowed for the candidate (the oracle cluster
//! and its descendants, as supplied by the caller) are ranked. The rank of
//! the candidate's best allowed pair is `1 - above / n`, with `above` the
//! number of ranked pairs with a strictly higher value. Pairs of equal value
//! share a rank, so the best candidate always scores 1.

use crate::core::MappingPair;
use std::collections::HashSet;

/// Returned when the candidate has no pair towards an allowed cluster.
pub const NO_RANK: f64 = -1.0;

pub fn percentile_rank<'a>(
    candidate_id: &str,
    pairs: impl IntoIterator<Item = &'a MappingPair>,
    allowed_clusters: &HashSet<String>,
) -> f64 {
    let ranked: Vec<&MappingPair> = pairs
        .into_iter()
        .filter(|pair| allowed_clusters.contains(pair.cluster_id()))
        .collect();

    let best = ranked
        .iter()
        .filter(|pair| pair.candidate_id() == candidate_id)
        .map(|pair| pair.attraction_value())
        .max_by(f64::total_cmp);

    let Some(best) = best else {
        return NO_RANK;
    };

    let above = ranked
        .iter()
        .filter(|pair| pair.attraction_value() > best)
        .count();
    round4(1.0 - above as f64 / ranked.len() as f64)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
