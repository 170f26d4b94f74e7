//! Observation module - Self-reported mood/energy logs and the adaptive
//! phase estimator built on them.

mod estimator;
mod history;
mod observation;

pub use estimator::{
    EstimationMode, ObservationEstimator, PhaseEstimate, ACCURACY_WINDOW, CONSISTENCY_WINDOW,
    FULL_CONFIDENCE_OBSERVATIONS, MIN_OBSERVATIONS,
};
pub use history::{ObservationHistory, DEFAULT_HISTORY_CAPACITY};
pub use observation::{Observation, ObservationError, MAX_RATING, MIN_RATING};
