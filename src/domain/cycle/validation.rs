//! Profile validation results.
//!
//! Validation never fails: every violation is collected into a
//! [`ProfileValidation`] and shown to the user as-is.

use serde::Serialize;
use thiserror::Error;

use super::profile::{
    MAX_CYCLE_LENGTH, MAX_PERIOD_DURATION, MIN_CYCLE_LENGTH, MIN_PERIOD_DURATION,
};

/// A single problem found in a cycle profile.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ProfileIssue {
    #[error("Date des dernières règles manquante")]
    MissingLastPeriodDate,

    #[error("Date des dernières règles invalide")]
    InvalidLastPeriodDate,

    #[error("La date des dernières règles ne peut pas être dans le futur")]
    LastPeriodInFuture,

    #[error(
        "Durée du cycle doit être entre {} et {} jours (reçu {actual})",
        MIN_CYCLE_LENGTH,
        MAX_CYCLE_LENGTH
    )]
    CycleLengthOutOfRange { actual: i32 },

    #[error(
        "Durée des règles doit être entre {} et {} jours (reçu {actual})",
        MIN_PERIOD_DURATION,
        MAX_PERIOD_DURATION
    )]
    PeriodDurationOutOfRange { actual: i32 },

    #[error("Durée des règles ({period}) doit être inférieure à la durée du cycle ({cycle})")]
    PeriodNotShorterThanCycle { period: i32, cycle: i32 },
}

/// Outcome of validating a cycle profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileValidation {
    pub is_valid: bool,
    pub errors: Vec<ProfileIssue>,
}

impl ProfileValidation {
    /// Builds a result from collected issues.
    pub fn from_issues(errors: Vec<ProfileIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// User-facing messages, one per issue.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Returns true if the given issue was reported.
    pub fn has(&self, issue: &ProfileIssue) -> bool {
        self.errors.contains(issue)
    }
}
