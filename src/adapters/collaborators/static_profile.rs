//! Profile provider holding a single in-memory profile.

use std::sync::{PoisonError, RwLock};

use crate::domain::cycle::CycleProfile;
use crate::ports::{CollaboratorError, ProfileProvider};

/// Serves whatever profile was last stored.
#[derive(Debug, Default)]
pub struct StaticProfileProvider {
    profile: RwLock<CycleProfile>,
}

impl StaticProfileProvider {
    pub fn new(profile: CycleProfile) -> Self {
        Self {
            profile: RwLock::new(profile),
        }
    }

    /// Replaces the stored profile.
    pub fn update(&self, profile: CycleProfile) {
        *self.profile.write().unwrap_or_else(PoisonError::into_inner) = profile;
    }
}

impl ProfileProvider for StaticProfileProvider {
    fn current_profile(&self) -> Result<CycleProfile, CollaboratorError> {
        Ok(self
            .profile
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
