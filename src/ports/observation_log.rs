//! ObservationLog port - Supplies logged observations.

use crate::domain::observation::Observation;

use super::CollaboratorError;

/// Port for reading the observation log.
pub trait ObservationLog: Send + Sync {
    /// Up to `limit` most recent observations, oldest first.
    fn recent_observations(&self, limit: usize) -> Result<Vec<Observation>, CollaboratorError>;
}
