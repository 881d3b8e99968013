//! Incremental mapping recommendations for reflexion analysis.
//!
//! Candidates (implementation entities) are scored against clusters
//! (architecture entities) by an external attract function. A
//! [`RecommendationFilter`](filter::RecommendationFilter) keeps the scores in
//! an [`AttractionMatrix`](matrix::AttractionMatrix) and maintains the set of
//! recommended pairs as scores change. The [`statistics`] module evaluates
//! mapping runs against an oracle and aggregates several runs.

pub mod attract;
pub mod cli;
pub mod config;
pub mod context;
pub mod core;
pub mod filter;
pub mod matrix;
pub mod recommender;
pub mod statistics;

pub use crate::attract::{AttractFunction, AttractFunctionConfig, FixedAttraction};
pub use crate::config::{ExperimentSettings, RecommendationSettings};
pub use crate::context::{ExperimentContext, MappingSource, StaticMappings};
pub use crate::core::{EntityKind, Error, MappingPair, PairKey, Result};
pub use crate::filter::{
    create_filter, FilterKind, HugMeFilter, MaxFilter, RecommendationFilter,
    ATTRACTION_VALUE_DELTA,
};
pub use crate::matrix::AttractionMatrix;
pub use crate::recommender::Recommender;
pub use crate::statistics::{
    percentile_rank, CandidateStatistic, ExperimentReport, MappingExperimentResult, MappingStep,
    ResultSummary,
};
