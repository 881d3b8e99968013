//! Evaluation of mapping experiments.
//!
//! Candidate statistics are collected while a run progresses and condensed
//! into a [`MappingExperimentResult`]. Results of several runs can be
//! averaged and written as reports.

pub mod candidate;
pub mod descriptive;
pub mod experiment;
pub mod percentile;
pub mod report;

pub use candidate::{CandidateStatistic, MappingStep};
pub use experiment::{MappingExperimentResult, ResultSummary, STD_NOT_AVAILABLE};
pub use percentile::{percentile_rank, NO_RANK};
pub use report::{
    CandidateRecord, ExperimentReport, JsonWriter, MarkdownWriter, ReportWriter, TerminalWriter,
};
