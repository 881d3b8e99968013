// Shared helpers for reflexmap integration tests
#![allow(dead_code)]

use reflexmap::{
    ExperimentContext, FixedAttraction, MappingExperimentResult, MappingPair, RecommendationSettings,
    Recommender, StaticMappings,
};
use std::path::{Path, PathBuf};

pub fn pair(candidate: &str, cluster: &str, value: f64) -> MappingPair {
    MappingPair::new(candidate, cluster, value).unwrap()
}

pub fn keys(pairs: &[MappingPair]) -> Vec<String> {
    pairs.iter().map(|p| p.key().to_string()).collect()
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Three candidates, two clusters; c1 and c2 have an obvious best cluster.
pub fn attract() -> FixedAttraction {
    FixedAttraction::new()
        .with_value("c1", "Core", 0.9)
        .with_value("c1", "UI", 0.1)
        .with_value("c2", "Core", 0.2)
        .with_value("c2", "UI", 0.7)
        .with_value("c3", "Core", 0.4)
        .with_value("c3", "UI", 0.4)
}

pub fn oracle() -> StaticMappings {
    StaticMappings::new()
        .with_expected("c1", "Core")
        .with_expected("c2", "Core")
        .with_expected("c3", "UI")
}

/// Run one recorded session: map automatically until nothing is left to
/// apply, then finish the recording.
pub fn recorded_run(settings: &RecommendationSettings, seed: i64) -> MappingExperimentResult {
    let mut recommender = Recommender::new(attract(), settings).unwrap();
    for cluster in ["Core", "UI"] {
        recommender.add_cluster(cluster).unwrap();
    }
    for candidate in ["c1", "c2", "c3"] {
        recommender.add_candidate(candidate).unwrap();
    }
    recommender
        .start_recording(
            Box::new(oracle()),
            ExperimentContext::new(settings.experiment.master_seed, seed),
        )
        .unwrap();

    loop {
        recommender.record_percentile_ranks().unwrap();
        if recommender.apply_automatic_mappings().unwrap().is_empty() {
            break;
        }
    }
    recommender.finish_recording().unwrap()
}
