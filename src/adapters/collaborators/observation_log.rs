//! Observation log backed by a bounded in-memory history.

use std::sync::{Mutex, PoisonError};

use crate::domain::observation::{Observation, ObservationHistory};
use crate::ports::{CollaboratorError, ObservationLog};

/// Append-only observation log keeping the most recent entries.
#[derive(Debug, Default)]
pub struct InMemoryObservationLog {
    history: Mutex<ObservationHistory>,
}

impl InMemoryObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: Mutex::new(ObservationHistory::with_capacity(capacity)),
        }
    }

    /// Appends an observation, dropping the oldest when full.
    pub fn record(&self, observation: Observation) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observation);
    }

    pub fn len(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObservationLog for InMemoryObservationLog {
    fn recent_observations(&self, limit: usize) -> Result<Vec<Observation>, CollaboratorError> {
        Ok(self
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recent(limit))
    }
}
