//! Shared error types for the recommendation engine

use std::fmt;
use thiserror::Error;

/// What kind of tracked entity a [`Error::MissingEntity`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// An active candidate statistic
    Statistic,
    /// A presence counter for a recommended candidate
    RecommendedCandidate,
    /// A presence counter for a recommended cluster
    RecommendedCluster,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Statistic => "candidate statistic",
            Self::RecommendedCandidate => "recommended candidate",
            Self::RecommendedCluster => "recommended cluster",
        };
        f.write_str(name)
    }
}

/// Main error type for reflexmap operations
///
/// The first four variants are lifecycle contract violations. Callers are
/// expected to treat them as fatal: the matrix and statistics invariants no
/// longer hold once one of them was raised.
#[derive(Debug, Error)]
pub enum Error {
    /// A statistic was registered twice for the same candidate
    #[error("Candidate statistic for ID {candidate_id} was already initialized")]
    DuplicateStatistic { candidate_id: String },

    /// An operation referenced an id that is not currently tracked
    #[error("No {kind} is tracked for ID {id}")]
    MissingEntity { kind: EntityKind, id: String },

    /// A report was requested before the results were calculated
    #[error("Cannot generate a report before the results were calculated")]
    ResultsNotCalculated,

    /// Invalid identifiers or settings
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a missing entity error
    pub fn missing(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::MissingEntity {
            kind,
            id: id.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Whether this error signals a broken caller contract rather than an
    /// environment problem.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateStatistic { .. }
                | Self::MissingEntity { .. }
                | Self::ResultsNotCalculated
                | Self::InvalidConfiguration(_)
        )
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
