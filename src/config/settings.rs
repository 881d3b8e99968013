use crate::attract::AttractFunctionConfig;
use crate::context::ExperimentContext;
use crate::core::{Error, Result};
use crate::filter::{FilterKind, ATTRACTION_VALUE_DELTA};
use serde::{Deserialize, Serialize};

/// Root configuration for recommendations and mapping experiments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSettings {
    /// Node type of implementation entities that may be mapped
    #[serde(default = "default_candidate_type")]
    pub candidate_type: String,

    /// Node type of architecture entities candidates are mapped onto
    #[serde(default = "default_cluster_type")]
    pub cluster_type: String,

    /// Recommendation strategy
    #[serde(default)]
    pub filter: FilterKind,

    /// Attraction values closer than this are treated as equal
    #[serde(default = "default_attraction_value_delta")]
    pub attraction_value_delta: f64,

    #[serde(default)]
    pub experiment: ExperimentSettings,

    /// Attract function block, passed through to reports
    #[serde(default)]
    pub attract_function: AttractFunctionConfig,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            candidate_type: default_candidate_type(),
            cluster_type: default_cluster_type(),
            filter: FilterKind::default(),
            attraction_value_delta: default_attraction_value_delta(),
            experiment: ExperimentSettings::default(),
            attract_function: AttractFunctionConfig::default(),
        }
    }
}

impl RecommendationSettings {
    /// Check every field, collecting all problems into one error.
    pub fn validate(&self) -> Result<()> {
        let problems: Vec<String> = [
            non_empty(&self.candidate_type, "candidate_type"),
            non_empty(&self.cluster_type, "cluster_type"),
            valid_delta(self.attraction_value_delta),
            self.experiment.validate(),
        ]
        .into_iter()
        .filter_map(|check| check.err())
        .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid(problems.join("; ")))
        }
    }

    /// Context for the first run of an experiment.
    pub fn experiment_context(&self) -> ExperimentContext {
        ExperimentContext::new(self.experiment.master_seed, self.experiment.master_seed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSettings {
    /// Seed all run seeds are derived from
    #[serde(default)]
    pub master_seed: i64,

    /// Number of runs to average over
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        Self {
            master_seed: 0,
            iterations: default_iterations(),
        }
    }
}

impl ExperimentSettings {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.iterations == 0 {
            Err("experiment.iterations must be at least 1".to_string())
        } else {
            Ok(())
        }
    }
}

fn non_empty(value: &str, name: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be empty", name))
    } else {
        Ok(())
    }
}

fn valid_delta(delta: f64) -> std::result::Result<(), String> {
    if delta.is_finite() && delta >= 0.0 {
        Ok(())
    } else {
        Err(format!(
            "attraction_value_delta must be finite and non-negative, got {}",
            delta
        ))
    }
}

pub fn default_candidate_type() -> String {
    "Class".to_string()
}

pub fn default_cluster_type() -> String {
    "Cluster".to_string()
}

pub fn default_attraction_value_delta() -> f64 {
    ATTRACTION_VALUE_DELTA
}

pub fn default_iterations() -> u32 {
    1
}
