//! Presence counters for ids touched by the current recommendations.

use crate::core::{EntityKind, Error, Result};
use std::collections::HashMap;

/// Counts how many recommended pairs reference each id.
///
/// An id is present while its count is positive. Decrementing an id that is
/// not present is an error instead of producing a negative count.
#[derive(Debug, Clone)]
pub struct RefCounter {
    kind: EntityKind,
    counts: HashMap<String, usize>,
}

impl RefCounter {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            counts: HashMap::new(),
        }
    }

    pub fn increment(&mut self, id: &str) {
        *self.counts.entry(id.to_string()).or_insert(0) += 1;
    }

    /// Decrement the count for `id`, forgetting the id once it reaches zero.
    pub fn decrement(&mut self, id: &str) -> Result<()> {
        let count = self
            .counts
            .get_mut(id)
            .ok_or_else(|| Error::missing(self.kind, id))?;
        *count -= 1;
        if *count == 0 {
            self.counts.remove(id);
        }
        Ok(())
    }

    pub fn count(&self, id: &str) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.counts.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
