//! A recommendation session.
//!
//! [`Recommender`] ties an attract function to a recommendation filter. It
//! keeps track of the clusters, which candidates are still unmapped and
//! where the mapped ones went, and feeds fresh attraction values into the
//! filter whenever the mapping changes. When recording is enabled every
//! mapping decision also ends up in a [`MappingExperimentResult`].

use crate::attract::AttractFunction;
use crate::config::RecommendationSettings;
use crate::context::{ExperimentContext, MappingSource};
use crate::core::{validate_id, Error, MappingPair, Result};
use crate::filter::{create_filter, RecommendationFilter};
use crate::statistics::{percentile_rank, MappingExperimentResult};
use std::collections::{BTreeSet, HashMap, HashSet};

pub struct Recommender<A: AttractFunction> {
    attract: A,
    settings: RecommendationSettings,
    filter: Box<dyn RecommendationFilter>,
    clusters: BTreeSet<String>,
    unmapped_candidates: BTreeSet<String>,
    mapped_candidates: HashMap<String, String>,
    recording: Option<Recording>,
}

struct Recording {
    oracle: Box<dyn MappingSource>,
    result: MappingExperimentResult,
    /// Candidates in the order they got mapped
    mapping_order: Vec<String>,
}

/// Current mapping of the session combined with the oracle's expectations.
struct SessionView<'a> {
    mapped_candidates: &'a HashMap<String, String>,
    oracle: &'a dyn MappingSource,
}

impl MappingSource for SessionView<'_> {
    fn maps_to(&self, candidate_id: &str) -> Option<String> {
        self.mapped_candidates.get(candidate_id).cloned()
    }

    fn expected_cluster(&self, candidate_id: &str) -> Option<String> {
        self.oracle.expected_cluster(candidate_id)
    }

    fn is_hit(&self, candidate_id: &str, cluster_id: &str) -> bool {
        self.oracle.is_hit(candidate_id, cluster_id)
    }

    fn allowed_clusters(&self, candidate_id: &str) -> HashSet<String> {
        self.oracle.allowed_clusters(candidate_id)
    }
}

impl<A: AttractFunction> Recommender<A> {
    pub fn new(attract: A, settings: &RecommendationSettings) -> Result<Self> {
        settings.validate()?;
        let filter = create_filter(settings.filter, settings.attraction_value_delta)?;
        Ok(Self {
            attract,
            settings: settings.clone(),
            filter,
            clusters: BTreeSet::new(),
            unmapped_candidates: BTreeSet::new(),
            mapped_candidates: HashMap::new(),
            recording: None,
        })
    }

    pub fn filter(&self) -> &dyn RecommendationFilter {
        self.filter.as_ref()
    }

    pub fn attract_function(&self) -> &A {
        &self.attract
    }

    pub fn clusters(&self) -> impl Iterator<Item = &str> {
        self.clusters.iter().map(String::as_str)
    }

    pub fn unmapped_candidates(&self) -> impl Iterator<Item = &str> {
        self.unmapped_candidates.iter().map(String::as_str)
    }

    pub fn maps_to(&self, candidate_id: &str) -> Option<&str> {
        self.mapped_candidates.get(candidate_id).map(String::as_str)
    }

    pub fn has_unmapped_candidates(&self) -> bool {
        !self.unmapped_candidates.is_empty()
    }

    pub fn recommendations(&self) -> Vec<MappingPair> {
        self.filter.get_recommendations()
    }

    pub fn automatic_mappings(&self) -> Vec<MappingPair> {
        self.filter.get_automatic_mappings()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Register an unmapped candidate and score it against every cluster.
    pub fn add_candidate(&mut self, candidate_id: &str) -> Result<()> {
        validate_id(candidate_id, "candidate")?;
        if self.mapped_candidates.contains_key(candidate_id)
            || !self.unmapped_candidates.insert(candidate_id.to_string())
        {
            return Ok(());
        }
        let clusters: Vec<String> = self.clusters.iter().cloned().collect();
        for cluster_id in &clusters {
            self.update_pair(candidate_id, cluster_id)?;
        }
        Ok(())
    }

    /// Register a candidate that is mapped from the start.
    pub fn add_mapped_candidate(&mut self, candidate_id: &str, cluster_id: &str) -> Result<()> {
        validate_id(candidate_id, "candidate")?;
        validate_id(cluster_id, "cluster")?;
        self.unmapped_candidates.remove(candidate_id);
        self.filter.remove_candidate(candidate_id)?;
        self.mapped_candidates
            .insert(candidate_id.to_string(), cluster_id.to_string());
        self.attract.handle_mapped(candidate_id, cluster_id);
        Ok(())
    }

    /// Register a cluster and score every unmapped candidate against it.
    pub fn add_cluster(&mut self, cluster_id: &str) -> Result<()> {
        validate_id(cluster_id, "cluster")?;
        if !self.clusters.insert(cluster_id.to_string()) {
            return Ok(());
        }
        let candidates: Vec<String> = self.unmapped_candidates.iter().cloned().collect();
        for candidate_id in &candidates {
            self.update_pair(candidate_id, cluster_id)?;
        }
        Ok(())
    }

    pub fn remove_cluster(&mut self, cluster_id: &str) -> Result<()> {
        if !self.clusters.remove(cluster_id) {
            log::warn!("Cluster {} is not part of the session", cluster_id);
        }
        self.filter.remove_cluster(cluster_id)
    }

    /// Recompute every (unmapped candidate, cluster) pair.
    pub fn refresh(&mut self) -> Result<()> {
        let candidates: Vec<String> = self.unmapped_candidates.iter().cloned().collect();
        let clusters: Vec<String> = self.clusters.iter().cloned().collect();
        for candidate_id in &candidates {
            for cluster_id in &clusters {
                self.update_pair(candidate_id, cluster_id)?;
            }
        }
        log::debug!(
            "Refreshed {} candidates against {} clusters",
            candidates.len(),
            clusters.len()
        );
        Ok(())
    }

    fn update_pair(&mut self, candidate_id: &str, cluster_id: &str) -> Result<()> {
        let value = self.attract.attraction_value(candidate_id, cluster_id);
        self.filter
            .update_mapping_pair(MappingPair::new(candidate_id, cluster_id, value)?)
    }

    /// Map a candidate onto a cluster and return the pair that was chosen.
    ///
    /// Pairs the filter never scored are returned with an attraction value
    /// of -1. A candidate that is already mapped elsewhere is unmapped first.
    pub fn map_candidate(&mut self, candidate_id: &str, cluster_id: &str) -> Result<MappingPair> {
        validate_id(candidate_id, "candidate")?;
        validate_id(cluster_id, "cluster")?;
        if self.mapped_candidates.contains_key(candidate_id) {
            self.unmap_candidate(candidate_id)?;
        }
        let chosen = match self.filter.get_mapping_pair(candidate_id, cluster_id) {
            Some(pair) => pair.clone(),
            None => MappingPair::new(candidate_id, cluster_id, -1.0)?,
        };

        self.unmapped_candidates.remove(candidate_id);
        self.mapped_candidates
            .insert(candidate_id.to_string(), cluster_id.to_string());
        self.filter.remove_candidate(candidate_id)?;
        self.attract.handle_mapped(candidate_id, cluster_id);

        if let Some(recording) = self.recording.as_mut() {
            if recording.result.contains_candidate_statistic(candidate_id) {
                recording
                    .result
                    .record_chosen_mapping(&chosen, recording.oracle.as_ref())?;
                recording.mapping_order.push(candidate_id.to_string());
            }
        }

        self.refresh()?;
        Ok(chosen)
    }

    /// Undo the mapping of a candidate and score it again.
    pub fn unmap_candidate(&mut self, candidate_id: &str) -> Result<()> {
        let cluster_id = self.mapped_candidates.remove(candidate_id).ok_or_else(|| {
            Error::invalid(format!("candidate {} is not mapped", candidate_id))
        })?;
        self.attract.handle_unmapped(candidate_id, &cluster_id);
        self.unmapped_candidates.insert(candidate_id.to_string());

        if let Some(recording) = self.recording.as_mut() {
            recording.mapping_order.retain(|id| id != candidate_id);
            if let Ok(statistic) = recording.result.candidate_statistic(candidate_id) {
                statistic.mapped_cluster_id = None;
                statistic.hit = false;
                statistic.attraction_value = -1.0;
            }
        }

        self.refresh()
    }

    /// Apply the automatic mappings of the filter, one cluster per
    /// candidate, and return the applied pairs.
    pub fn apply_automatic_mappings(&mut self) -> Result<Vec<MappingPair>> {
        let mut seen = HashSet::new();
        let pairs: Vec<MappingPair> = self
            .automatic_mappings()
            .into_iter()
            .filter(|pair| seen.insert(pair.candidate_id().to_string()))
            .collect();

        let mut applied = Vec::with_capacity(pairs.len());
        for pair in pairs {
            applied.push(self.map_candidate(pair.candidate_id(), pair.cluster_id())?);
        }
        Ok(applied)
    }

    /// Start collecting statistics for every known candidate.
    pub fn start_recording(
        &mut self,
        oracle: Box<dyn MappingSource>,
        context: ExperimentContext,
    ) -> Result<()> {
        let mut settings = self.settings.clone();
        settings.attract_function = self.attract.config();
        let mut result = MappingExperimentResult::new(context);
        result.add_config_information(&settings);

        let view = SessionView {
            mapped_candidates: &self.mapped_candidates,
            oracle: oracle.as_ref(),
        };
        let mut candidates: Vec<&String> = self
            .mapped_candidates
            .keys()
            .chain(self.unmapped_candidates.iter())
            .collect();
        candidates.sort();
        for candidate_id in candidates {
            result.add_candidate_statistic_result(candidate_id, &view)?;
        }

        log::info!(
            "Recording {} candidates, {} initially mapped",
            self.unmapped_candidates.len() + self.mapped_candidates.len(),
            self.mapped_candidates.len()
        );
        self.recording = Some(Recording {
            oracle,
            result,
            mapping_order: Vec::new(),
        });
        Ok(())
    }

    /// Append a percentile rank sample for every candidate still unmapped.
    pub fn record_percentile_ranks(&mut self) -> Result<()> {
        let recording = self
            .recording
            .as_mut()
            .ok_or_else(|| Error::invalid("statistics recording was not started"))?;
        let pairs = self.filter.get_mapping_pairs();

        for candidate_id in &self.unmapped_candidates {
            if !recording.result.contains_candidate_statistic(candidate_id) {
                continue;
            }
            let allowed = recording.oracle.allowed_clusters(candidate_id);
            let rank = percentile_rank(candidate_id, &pairs, &allowed);
            recording.result.record_percentile_rank(candidate_id, rank)?;
        }
        Ok(())
    }

    /// Finish all statistics and return the calculated result.
    pub fn finish_recording(&mut self) -> Result<MappingExperimentResult> {
        let Recording {
            mut result,
            mut mapping_order,
            ..
        } = self
            .recording
            .take()
            .ok_or_else(|| Error::invalid("statistics recording was not started"))?;

        mapping_order.reverse();
        result.finish_mapped_candidates(mapping_order)?;
        result.finish_unmapped_candidates()?;
        result.calculate_results();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attract::{AttractFunctionConfig, FixedAttraction};
    use crate::context::StaticMappings;
    use crate::filter::FilterKind;
    use crate::statistics::MappingStep;

    fn attract() -> FixedAttraction {
        FixedAttraction::new()
            .with_value("c1", "A", 0.9)
            .with_value("c1", "B", 0.2)
            .with_value("c2", "A", 0.3)
            .with_value("c2", "B", 0.5)
            .with_value("c3", "A", 0.1)
            .with_value("c3", "B", 0.1)
    }

    fn session(filter: FilterKind) -> Recommender<FixedAttraction> {
        let settings = RecommendationSettings {
            filter,
            attraction_value_delta: 0.05,
            ..Default::default()
        };
        let mut recommender = Recommender::new(attract(), &settings).unwrap();
        for cluster in ["A", "B"] {
            recommender.add_cluster(cluster).unwrap();
        }
        for candidate in ["c1", "c2", "c3"] {
            recommender.add_candidate(candidate).unwrap();
        }
        recommender
    }

    #[test]
    fn test_scores_every_pair() {
        let recommender = session(FilterKind::Max);
        assert_eq!(recommender.filter().get_mapping_pairs().len(), 6);
        let recommendations = recommender.recommendations();
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].key().to_string(), "(c1, A)");
    }

    #[test]
    fn test_mapping_removes_candidate_from_filter() {
        let mut recommender = session(FilterKind::Max);
        let chosen = recommender.map_candidate("c1", "A").unwrap();

        assert_eq!(chosen.attraction_value(), 0.9);
        assert_eq!(recommender.maps_to("c1"), Some("A"));
        assert!(recommender.filter().matrix().pairs_for_candidate("c1").next().is_none());
        assert_eq!(recommender.recommendations()[0].key().to_string(), "(c2, B)");
    }

    #[test]
    fn test_unmap_scores_candidate_again() {
        let mut recommender = session(FilterKind::Max);
        recommender.map_candidate("c1", "A").unwrap();
        recommender.unmap_candidate("c1").unwrap();

        assert_eq!(recommender.maps_to("c1"), None);
        assert_eq!(recommender.recommendations()[0].key().to_string(), "(c1, A)");
        assert!(recommender.unmap_candidate("c1").is_err());
    }

    /// Records the mapping hooks it receives.
    struct SpyAttraction {
        inner: FixedAttraction,
        events: Vec<String>,
    }

    impl AttractFunction for SpyAttraction {
        fn attraction_value(&self, candidate_id: &str, cluster_id: &str) -> f64 {
            self.inner.attraction_value(candidate_id, cluster_id)
        }

        fn handle_mapped(&mut self, candidate_id: &str, cluster_id: &str) {
            self.events.push(format!("map {} {}", candidate_id, cluster_id));
        }

        fn handle_unmapped(&mut self, candidate_id: &str, cluster_id: &str) {
            self.events.push(format!("unmap {} {}", candidate_id, cluster_id));
        }

        fn config(&self) -> AttractFunctionConfig {
            AttractFunctionConfig::new("Spy")
        }
    }

    fn spy_session() -> Recommender<SpyAttraction> {
        let spy = SpyAttraction {
            inner: attract(),
            events: Vec::new(),
        };
        let mut recommender = Recommender::new(spy, &RecommendationSettings::default()).unwrap();
        for cluster in ["A", "B"] {
            recommender.add_cluster(cluster).unwrap();
        }
        for candidate in ["c1", "c2", "c3"] {
            recommender.add_candidate(candidate).unwrap();
        }
        recommender
    }

    #[test]
    fn test_remapping_unmaps_old_cluster_first() {
        let mut recommender = spy_session();
        recommender.map_candidate("c1", "A").unwrap();
        let chosen = recommender.map_candidate("c1", "B").unwrap();

        assert_eq!(chosen.attraction_value(), 0.2);
        assert_eq!(recommender.maps_to("c1"), Some("B"));
        assert_eq!(
            recommender.attract_function().events,
            vec!["map c1 A", "unmap c1 A", "map c1 B"]
        );
    }

    #[test]
    fn test_remapping_during_recording_keeps_one_step() {
        let oracle = StaticMappings::new()
            .with_expected("c1", "B")
            .with_expected("c2", "B")
            .with_expected("c3", "A");
        let mut recommender = spy_session();
        recommender
            .start_recording(Box::new(oracle), ExperimentContext::new(1, 1))
            .unwrap();

        recommender.map_candidate("c1", "A").unwrap();
        recommender.map_candidate("c2", "B").unwrap();
        recommender.map_candidate("c1", "B").unwrap();

        let result = recommender.finish_recording().unwrap();
        let steps: Vec<(&str, MappingStep, Option<&str>)> = result
            .finished_statistics()
            .iter()
            .map(|s| {
                (
                    s.candidate_id.as_str(),
                    s.mapped_at_mapping_step,
                    s.mapped_cluster_id.as_deref(),
                )
            })
            .collect();
        assert_eq!(
            steps,
            vec![
                ("c2", MappingStep::Step(0)),
                ("c1", MappingStep::Step(1)),
                ("c3", MappingStep::LeftOver),
            ]
        );
        assert_eq!(result.summary().total_hits, 2);
    }

    #[test]
    fn test_report_carries_attract_function_config() {
        let mut recommender = session(FilterKind::Max);
        recommender
            .start_recording(Box::new(StaticMappings::new()), ExperimentContext::new(1, 1))
            .unwrap();
        let report = recommender.finish_recording().unwrap().to_report().unwrap();

        assert_eq!(report.attract_function, recommender.attract_function().config());
        assert_eq!(report.attract_function.kind, "FixedAttraction");
    }

    #[test]
    fn test_remove_cluster_drops_its_pairs() {
        let mut recommender = session(FilterKind::Max);
        recommender.remove_cluster("A").unwrap();
        assert_eq!(recommender.recommendations()[0].key().to_string(), "(c2, B)");
        recommender.refresh().unwrap();
        assert_eq!(recommender.filter().get_mapping_pairs().len(), 3);
    }

    #[test]
    fn test_recorded_run() {
        let oracle = StaticMappings::new()
            .with_expected("c0", "A")
            .with_expected("c1", "A")
            .with_expected("c2", "A")
            .with_expected("c3", "B");
        let mut recommender = session(FilterKind::Max);
        recommender.add_mapped_candidate("c0", "A").unwrap();
        recommender
            .start_recording(Box::new(oracle), ExperimentContext::new(1, 1))
            .unwrap();

        recommender.record_percentile_ranks().unwrap();
        recommender.map_candidate("c1", "A").unwrap();
        recommender.record_percentile_ranks().unwrap();
        recommender.map_candidate("c2", "B").unwrap();

        let result = recommender.finish_recording().unwrap();
        let summary = result.summary();
        assert_eq!(summary.candidates_total, 4);
        assert_eq!(summary.initially_mapped, 1);
        assert_eq!(summary.total_hits, 1);
        assert_eq!(summary.total_fails, 1);
        assert_eq!(summary.candidates_left_over, 1);

        let steps: Vec<(&str, MappingStep)> = result
            .finished_statistics()
            .iter()
            .map(|s| (s.candidate_id.as_str(), s.mapped_at_mapping_step))
            .collect();
        assert_eq!(
            steps,
            vec![
                ("c0", MappingStep::InitiallyMapped),
                ("c1", MappingStep::Step(0)),
                ("c2", MappingStep::Step(1)),
                ("c3", MappingStep::LeftOver),
            ]
        );
        assert!(!recommender.is_recording());
    }

    #[test]
    fn test_hug_me_automatic_mappings_are_applied() {
        let mut recommender = session(FilterKind::HugMe);
        let applied = recommender.apply_automatic_mappings().unwrap();
        let keys: Vec<String> = applied.iter().map(|p| p.key().to_string()).collect();
        assert_eq!(keys, vec!["(c1, A)", "(c2, B)"]);
        assert!(recommender.unmapped_candidates().eq(["c3"]));
        assert!(recommender.has_unmapped_candidates());

        recommender.map_candidate("c3", "A").unwrap();
        assert!(!recommender.has_unmapped_candidates());
    }

    #[test]
    fn test_percentile_ranks_need_recording() {
        let mut recommender = session(FilterKind::Max);
        assert!(recommender.record_percentile_ranks().is_err());
        assert!(recommender.finish_recording().is_err());
    }
}
