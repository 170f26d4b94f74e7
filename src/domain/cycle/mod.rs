//! Cycle module - Calendar-based cycle day and phase arithmetic.
//!
//! # Components
//!
//! - `Phase` - The four cycle phases
//! - `CycleProfile` / `DateInput` - User cycle settings as received
//! - `PhaseCalculator` - Pure date/phase arithmetic evaluated at a fixed instant
//! - `ProfileValidation` - Accumulated, user-facing profile problems
//!
//! Nothing here fails: missing or unreadable dates resolve to documented
//! defaults and out-of-range numbers are clamped.

mod calculator;
mod phase;
mod profile;
mod validation;

pub use calculator::{
    follicular_end, ovulatory_end, phase_for_day, CycleSnapshot, PhaseCalculator,
};
pub use phase::Phase;
pub use profile::{
    sanitize_cycle_length, sanitize_period_duration, CycleProfile, DateInput,
    DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_DURATION, MAX_CYCLE_LENGTH, MAX_PERIOD_DURATION,
    MIN_CYCLE_LENGTH, MIN_PERIOD_DURATION,
};
pub use validation::{ProfileIssue, ProfileValidation};
