//! Bounded, append-only observation history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::observation::Observation;

/// Default number of observations retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Keeps the most recent observations, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationHistory {
    capacity: usize,
    entries: VecDeque<Observation>,
}

impl Default for ObservationHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ObservationHistory {
    /// Creates an empty history keeping at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends an observation, dropping the oldest when full.
    pub fn push(&mut self, observation: Observation) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(observation);
    }

    /// The last `n` observations in chronological order.
    pub fn recent(&self, n: usize) -> Vec<Observation> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// All retained observations in chronological order.
    pub fn to_vec(&self) -> Vec<Observation> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
