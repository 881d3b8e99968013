//! Replaying recorded filter events.
//!
//! Event logs are JSON arrays such as
//!
//! ```json
//! [
//!   { "update": { "candidate": "c1", "cluster": "A", "value": 0.9 } },
//!   { "remove_candidate": "c1" },
//!   { "remove_cluster": "A" }
//! ]
//! ```

use super::RecommendationFilter;
use crate::core::{MappingPair, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterEvent {
    Update {
        candidate: String,
        cluster: String,
        value: f64,
    },
    RemoveCandidate(String),
    RemoveCluster(String),
}

impl FilterEvent {
    pub fn apply(&self, filter: &mut dyn RecommendationFilter) -> Result<()> {
        match self {
            Self::Update {
                candidate,
                cluster,
                value,
            } => filter.update_mapping_pair(MappingPair::new(
                candidate.as_str(),
                cluster.as_str(),
                *value,
            )?),
            Self::RemoveCandidate(id) => filter.remove_candidate(id),
            Self::RemoveCluster(id) => filter.remove_cluster(id),
        }
    }
}

pub fn parse_events(contents: &str) -> Result<Vec<FilterEvent>> {
    Ok(serde_json::from_str(contents)?)
}

pub fn load_events(path: &Path) -> Result<Vec<FilterEvent>> {
    parse_events(&fs::read_to_string(path)?)
}

/// Apply events in order, stopping at the first failure.
pub fn replay(filter: &mut dyn RecommendationFilter, events: &[FilterEvent]) -> Result<()> {
    for event in events {
        event.apply(filter)?;
    }
    log::debug!(
        "Replayed {} events, {} pairs stored",
        events.len(),
        filter.matrix().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MaxFilter;
    use indoc::indoc;

    #[test]
    fn test_parse_and_replay() {
        let events = parse_events(indoc! {r#"
            [
              { "update": { "candidate": "c1", "cluster": "A", "value": 0.9 } },
              { "update": { "candidate": "c2", "cluster": "A", "value": 0.5 } },
              { "remove_candidate": "c1" }
            ]
        "#})
        .unwrap();
        assert_eq!(events.len(), 3);

        let mut filter = MaxFilter::new(0.01).unwrap();
        replay(&mut filter, &events).unwrap();
        let keys: Vec<String> = filter
            .get_recommendations()
            .iter()
            .map(|p| p.key().to_string())
            .collect();
        assert_eq!(keys, vec!["(c2, A)"]);
    }

    #[test]
    fn test_update_with_empty_id_fails() {
        let event = FilterEvent::Update {
            candidate: String::new(),
            cluster: "A".into(),
            value: 1.0,
        };
        let mut filter = MaxFilter::new(0.01).unwrap();
        assert!(event.apply(&mut filter).is_err());
    }
}
