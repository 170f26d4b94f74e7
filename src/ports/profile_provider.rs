//! ProfileProvider port - Supplies the user's cycle profile.

use crate::domain::cycle::CycleProfile;

use super::CollaboratorError;

/// Port for reading the current cycle profile.
///
/// Resolved once at wiring time and handed to the pipeline.
pub trait ProfileProvider: Send + Sync {
    /// The profile as currently stored.
    fn current_profile(&self) -> Result<CycleProfile, CollaboratorError>;
}
