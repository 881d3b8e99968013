//! Results of one mapping experiment run, or of several runs averaged.
//!
//! During a run every candidate under observation gets a
//! [`CandidateStatistic`]. Statistics start out *active* and are *finished*
//! exactly once: when the candidate was mapped before the run started, when
//! the driver reports the mapping order, or at the end of the run for
//! candidates that never got mapped. [`MappingExperimentResult::calculate_results`]
//! then derives counts and rates from the finished statistics.

use super::candidate::{CandidateStatistic, MappingStep};
use super::descriptive::{mean, population_std_dev, ratio};
use super::report::{CandidateRecord, ExperimentReport};
use crate::config::RecommendationSettings;
use crate::context::{ExperimentContext, MappingSource};
use crate::core::{validate_id, EntityKind, Error, MappingPair, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard deviations stay at this value unless results were averaged.
pub const STD_NOT_AVAILABLE: f64 = -1.0;

/// Counts and rates derived from finished candidate statistics.
///
/// Counts are summed and rates averaged when several runs are combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub candidates_total: usize,
    pub candidates_considered: usize,
    pub initially_mapped: usize,
    pub candidates_left_over: usize,
    pub total_hits: usize,
    pub total_fails: usize,
    pub mapping_rate: f64,
    pub mapping_rate_std: f64,
    pub hit_rate_all: f64,
    pub hit_rate_all_std: f64,
    pub hit_rate_mapped: f64,
    pub hit_rate_mapped_std: f64,
    pub precision: f64,
    pub precision_std: f64,
    pub recall: f64,
    pub recall_std: f64,
    pub f_score: f64,
    pub f_score_std: f64,
    pub average_percentile_rank_globally: f64,
}

impl Default for ResultSummary {
    fn default() -> Self {
        Self {
            candidates_total: 0,
            candidates_considered: 0,
            initially_mapped: 0,
            candidates_left_over: 0,
            total_hits: 0,
            total_fails: 0,
            mapping_rate: 0.0,
            mapping_rate_std: STD_NOT_AVAILABLE,
            hit_rate_all: 0.0,
            hit_rate_all_std: STD_NOT_AVAILABLE,
            hit_rate_mapped: 0.0,
            hit_rate_mapped_std: STD_NOT_AVAILABLE,
            precision: 0.0,
            precision_std: STD_NOT_AVAILABLE,
            recall: 0.0,
            recall_std: STD_NOT_AVAILABLE,
            f_score: 0.0,
            f_score_std: STD_NOT_AVAILABLE,
            average_percentile_rank_globally: -1.0,
        }
    }
}

impl ResultSummary {
    /// Derive the summary of a single run.
    pub fn from_statistics(statistics: &[CandidateStatistic]) -> Self {
        let candidates_total = statistics.len();
        let initially_mapped = count(statistics, |s| !s.mapped_at_mapping_step.is_considered());
        let candidates_left_over =
            count(statistics, |s| s.mapped_at_mapping_step == MappingStep::LeftOver);
        let total_hits = count(statistics, |s| is_mapped_during_run(s) && s.hit);
        let total_fails = count(statistics, |s| is_mapped_during_run(s) && !s.hit);
        let candidates_considered = candidates_total - initially_mapped;
        let mapped = candidates_considered - candidates_left_over;

        let precision = ratio(total_hits, total_hits + total_fails);
        let recall = ratio(total_hits, total_hits + candidates_left_over);
        let f_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        let valid_ranks: Vec<f64> = statistics
            .iter()
            .map(|s| s.average_percentile_rank)
            .filter(|rank| *rank >= 0.0)
            .collect();

        Self {
            candidates_total,
            candidates_considered,
            initially_mapped,
            candidates_left_over,
            total_hits,
            total_fails,
            mapping_rate: ratio(mapped, candidates_considered),
            hit_rate_all: ratio(total_hits, candidates_considered),
            hit_rate_mapped: ratio(total_hits, mapped),
            precision,
            recall,
            f_score,
            average_percentile_rank_globally: mean(&valid_ranks).unwrap_or(-1.0),
            ..Self::default()
        }
    }

    /// Combine the summaries of several runs. Returns `None` for no input.
    pub fn average(summaries: &[&ResultSummary]) -> Option<Self> {
        if summaries.is_empty() {
            return None;
        }
        let sum = |field: fn(&ResultSummary) -> usize| -> usize {
            summaries.iter().map(|s| field(s)).sum()
        };
        let values = |field: fn(&ResultSummary) -> f64| -> Vec<f64> {
            summaries.iter().map(|s| field(s)).collect()
        };
        let mean_and_std = |field: fn(&ResultSummary) -> f64| {
            let values = values(field);
            (
                mean(&values).unwrap_or(0.0),
                population_std_dev(&values).unwrap_or(STD_NOT_AVAILABLE),
            )
        };

        let (mapping_rate, mapping_rate_std) = mean_and_std(|s| s.mapping_rate);
        let (hit_rate_all, hit_rate_all_std) = mean_and_std(|s| s.hit_rate_all);
        let (hit_rate_mapped, hit_rate_mapped_std) = mean_and_std(|s| s.hit_rate_mapped);
        let (precision, precision_std) = mean_and_std(|s| s.precision);
        let (recall, recall_std) = mean_and_std(|s| s.recall);
        let (f_score, f_score_std) = mean_and_std(|s| s.f_score);

        // Runs without any ranked candidate carry -1 and are left out
        let valid_ranks: Vec<f64> = values(|s| s.average_percentile_rank_globally)
            .into_iter()
            .filter(|rank| *rank >= 0.0)
            .collect();

        Some(Self {
            candidates_total: sum(|s| s.candidates_total),
            candidates_considered: sum(|s| s.candidates_considered),
            initially_mapped: sum(|s| s.initially_mapped),
            candidates_left_over: sum(|s| s.candidates_left_over),
            total_hits: sum(|s| s.total_hits),
            total_fails: sum(|s| s.total_fails),
            mapping_rate,
            mapping_rate_std,
            hit_rate_all,
            hit_rate_all_std,
            hit_rate_mapped,
            hit_rate_mapped_std,
            precision,
            precision_std,
            recall,
            recall_std,
            f_score,
            f_score_std,
            average_percentile_rank_globally: mean(&valid_ranks).unwrap_or(-1.0),
        })
    }

    /// The six rates, in report order.
    pub fn rates(&self) -> [(&'static str, f64, f64); 6] {
        [
            ("Mapping rate", self.mapping_rate, self.mapping_rate_std),
            ("Hit rate (all)", self.hit_rate_all, self.hit_rate_all_std),
            ("Hit rate (mapped)", self.hit_rate_mapped, self.hit_rate_mapped_std),
            ("Precision", self.precision, self.precision_std),
            ("Recall", self.recall, self.recall_std),
            ("F-score", self.f_score, self.f_score_std),
        ]
    }
}

fn count(
    statistics: &[CandidateStatistic],
    predicate: impl Fn(&CandidateStatistic) -> bool,
) -> usize {
    statistics.iter().filter(|s| predicate(s)).count()
}

fn is_mapped_during_run(statistic: &CandidateStatistic) -> bool {
    matches!(statistic.mapped_at_mapping_step, MappingStep::Step(_))
}

#[derive(Debug, Clone, Default)]
pub struct MappingExperimentResult {
    context: ExperimentContext,
    settings: RecommendationSettings,
    summary: ResultSummary,
    calculated: bool,
    averaged: bool,
    active: HashMap<String, CandidateStatistic>,
    finished: Vec<CandidateStatistic>,
}

impl MappingExperimentResult {
    pub fn new(context: ExperimentContext) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }

    /// Attach the settings the run was performed with.
    pub fn add_config_information(&mut self, settings: &RecommendationSettings) {
        self.settings = settings.clone();
    }

    pub fn context(&self) -> &ExperimentContext {
        &self.context
    }

    pub fn settings(&self) -> &RecommendationSettings {
        &self.settings
    }

    pub fn summary(&self) -> &ResultSummary {
        &self.summary
    }

    pub fn is_calculated(&self) -> bool {
        self.calculated
    }

    /// Whether this result was synthesized from several runs.
    pub fn is_averaged(&self) -> bool {
        self.averaged
    }

    /// Finished statistics in mapping order.
    pub fn finished_statistics(&self) -> &[CandidateStatistic] {
        &self.finished
    }

    pub fn active_candidates(&self) -> impl Iterator<Item = &str> {
        self.active.keys().map(String::as_str)
    }

    /// Start observing a candidate.
    ///
    /// Fails while a statistic for the candidate is still active. A finished
    /// candidate may be observed again, e.g. after it got unmapped.
    ///
    /// A candidate that is already mapped is finished right away as
    /// initially mapped, with its hit flag taken from `source`.
    pub fn add_candidate_statistic_result(
        &mut self,
        candidate_id: &str,
        source: &dyn MappingSource,
    ) -> Result<()> {
        validate_id(candidate_id, "candidate")?;
        if self.active.contains_key(candidate_id) {
            return Err(Error::DuplicateStatistic {
                candidate_id: candidate_id.to_string(),
            });
        }

        let mut statistic = CandidateStatistic::new(candidate_id);
        statistic.expected_cluster_id = source.expected_cluster(candidate_id);

        match source.maps_to(candidate_id) {
            Some(cluster_id) => {
                statistic.hit = source.is_hit(candidate_id, &cluster_id);
                statistic.mapped_cluster_id = Some(cluster_id);
                statistic.mapped_at_mapping_step = MappingStep::InitiallyMapped;
                log::debug!("Candidate {} is initially mapped", candidate_id);
                self.finished.push(statistic);
            }
            None => {
                self.active.insert(candidate_id.to_string(), statistic);
            }
        }
        Ok(())
    }

    /// Move an active statistic to the finished list.
    pub fn finish_candidate_statistic_result(&mut self, candidate_id: &str) -> Result<()> {
        let statistic = self
            .active
            .remove(candidate_id)
            .ok_or_else(|| Error::missing(EntityKind::Statistic, candidate_id))?;
        log::debug!(
            "Finished statistic for {} at step {}",
            candidate_id,
            statistic.mapped_at_mapping_step
        );
        self.finished.push(statistic);
        Ok(())
    }

    /// Finish every still active statistic as left over.
    pub fn finish_unmapped_candidates(&mut self) -> Result<()> {
        let mut remaining: Vec<String> = self.active.keys().cloned().collect();
        remaining.sort();
        for candidate_id in remaining {
            if let Some(statistic) = self.active.get_mut(&candidate_id) {
                statistic.mapped_at_mapping_step = MappingStep::LeftOver;
            }
            self.finish_candidate_statistic_result(&candidate_id)?;
        }
        Ok(())
    }

    /// Finish candidates in the order they got mapped.
    ///
    /// `order` lists the most recently mapped candidate first. Ids are
    /// popped from the back and receive steps 0, 1, 2, ...; ids without an
    /// active statistic are skipped and do not consume a step.
    pub fn finish_mapped_candidates(&mut self, mut order: Vec<String>) -> Result<()> {
        let mut step = 0;
        while let Some(candidate_id) = order.pop() {
            let Some(statistic) = self.active.get_mut(&candidate_id) else {
                log::debug!("Skipping {}: no active statistic", candidate_id);
                continue;
            };
            statistic.mapped_at_mapping_step = MappingStep::Step(step);
            self.finish_candidate_statistic_result(&candidate_id)?;
            step += 1;
        }
        Ok(())
    }

    pub fn contains_candidate_statistic(&self, candidate_id: &str) -> bool {
        self.active.contains_key(candidate_id)
    }

    /// The active statistic of a candidate.
    pub fn candidate_statistic(&mut self, candidate_id: &str) -> Result<&mut CandidateStatistic> {
        self.active
            .get_mut(candidate_id)
            .ok_or_else(|| Error::missing(EntityKind::Statistic, candidate_id))
    }

    pub fn record_percentile_rank(&mut self, candidate_id: &str, rank: f64) -> Result<()> {
        self.candidate_statistic(candidate_id)?
            .record_percentile_rank(rank);
        Ok(())
    }

    /// Remember which pair was applied for an active candidate.
    pub fn record_chosen_mapping(
        &mut self,
        pair: &MappingPair,
        source: &dyn MappingSource,
    ) -> Result<()> {
        let hit = source.is_hit(pair.candidate_id(), pair.cluster_id());
        let statistic = self.candidate_statistic(pair.candidate_id())?;
        statistic.mapped_cluster_id = Some(pair.cluster_id().to_string());
        statistic.attraction_value = pair.attraction_value();
        statistic.hit = hit;
        Ok(())
    }

    /// Derive the summary from the finished statistics.
    ///
    /// Only the first call computes anything; averaged results carry their
    /// summary already.
    pub fn calculate_results(&mut self) {
        if self.calculated {
            log::warn!("Results were already calculated; keeping the existing values");
            return;
        }
        self.calculated = true;
        if self.averaged {
            return;
        }
        if !self.active.is_empty() {
            log::warn!(
                "Calculating results with {} candidates still active",
                self.active.len()
            );
        }

        for statistic in &mut self.finished {
            statistic.calculate_results();
        }
        self.summary = ResultSummary::from_statistics(&self.finished);
        log::info!(
            "Calculated results for {} candidates: precision {:.4}, recall {:.4}",
            self.summary.candidates_total,
            self.summary.precision,
            self.summary.recall
        );
    }

    /// Combine finished runs into a new result. The inputs are not modified.
    pub fn average_results(
        results: &[MappingExperimentResult],
        settings: &RecommendationSettings,
    ) -> Result<Self> {
        if results.iter().any(|r| !r.calculated) {
            return Err(Error::ResultsNotCalculated);
        }
        let summaries: Vec<&ResultSummary> = results.iter().map(|r| &r.summary).collect();
        let summary = ResultSummary::average(&summaries)
            .ok_or_else(|| Error::invalid("cannot average an empty list of results"))?;

        let master_seed = results[0].context.master_seed;
        let context = ExperimentContext {
            master_seed,
            current_seed: master_seed,
            iterations: results.iter().map(|r| r.context.iterations).sum(),
        };
        log::info!(
            "Averaged {} results: precision {:.4} (std {:.4})",
            results.len(),
            summary.precision,
            summary.precision_std
        );

        let mut averaged = Self {
            context,
            summary,
            averaged: true,
            ..Self::default()
        };
        averaged.add_config_information(settings);
        averaged.calculate_results();
        Ok(averaged)
    }

    /// Structured report of a calculated result.
    pub fn to_report(&self) -> Result<ExperimentReport> {
        if !self.calculated {
            return Err(Error::ResultsNotCalculated);
        }
        Ok(ExperimentReport {
            generated_at: chrono::Utc::now(),
            context: self.context,
            averaged: self.averaged,
            candidate_type: self.settings.candidate_type.clone(),
            cluster_type: self.settings.cluster_type.clone(),
            filter: self.settings.filter,
            summary: self.summary.clone(),
            attract_function: self.settings.attract_function.clone(),
            candidates: self.finished.iter().map(CandidateRecord::from).collect(),
        })
    }

    /// Rebuild a calculated result from a report written earlier.
    pub fn from_report(report: &ExperimentReport) -> Self {
        let settings = RecommendationSettings {
            candidate_type: report.candidate_type.clone(),
            cluster_type: report.cluster_type.clone(),
            filter: report.filter,
            attract_function: report.attract_function.clone(),
            ..RecommendationSettings::default()
        };
        Self {
            context: report.context,
            settings,
            summary: report.summary.clone(),
            calculated: true,
            averaged: report.averaged,
            active: HashMap::new(),
            finished: report.candidates.iter().map(CandidateStatistic::from).collect(),
        }
    }
}
