//! Self-reported observation records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::cycle::Phase;
use crate::domain::foundation::Timestamp;

/// Lowest mood/energy rating.
pub const MIN_RATING: f64 = 1.0;
/// Highest mood/energy rating.
pub const MAX_RATING: f64 = 5.0;

/// Errors raised by strict observation construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObservationError {
    #[error("{field} must be between 1 and 5, got {actual}")]
    RatingOutOfRange { field: &'static str, actual: f64 },
}

/// A single mood/energy log entry, optionally labelled with a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub phase: Option<Phase>,
    pub mood: f64,
    pub energy: f64,
    pub timestamp_ms: i64,
}

impl Observation {
    /// Creates an observation, clamping ratings into [1, 5].
    pub fn new(phase: Option<Phase>, mood: f64, energy: f64, at: Timestamp) -> Self {
        Self {
            phase,
            mood: clamp_rating(mood),
            energy: clamp_rating(energy),
            timestamp_ms: at.as_unix_millis(),
        }
    }

    /// Creates an observation, rejecting ratings outside [1, 5].
    pub fn try_new(
        phase: Option<Phase>,
        mood: f64,
        energy: f64,
        at: Timestamp,
    ) -> Result<Self, ObservationError> {
        check_rating("mood", mood)?;
        check_rating("energy", energy)?;
        Ok(Self {
            phase,
            mood,
            energy,
            timestamp_ms: at.as_unix_millis(),
        })
    }

    /// Whether both observations logged the same mood.
    pub fn same_mood(&self, other: &Observation) -> bool {
        (self.mood - other.mood).abs() < f64::EPSILON
    }

    /// Whether both observations logged the same energy.
    pub fn same_energy(&self, other: &Observation) -> bool {
        (self.energy - other.energy).abs() < f64::EPSILON
    }
}

fn clamp_rating(value: f64) -> f64 {
    if value.is_nan() {
        MIN_RATING
    } else {
        value.clamp(MIN_RATING, MAX_RATING)
    }
}

fn check_rating(field: &'static str, value: f64) -> Result<(), ObservationError> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(())
    } else {
        Err(ObservationError::RatingOutOfRange {
            field,
            actual: value,
        })
    }
}
