//! Phase Calculator - Date arithmetic for cycle day and phase.
//!
//! All operations are evaluated against a fixed "now" captured when the
//! calculator is built, which keeps every result deterministic for a given
//! instant.
//!
//! # Phase boundaries
//!
//! For a cycle day `d` (1-based), sanitized cycle length `L` and period
//! duration `P`:
//!
//! | Condition                                    | Phase      |
//! |----------------------------------------------|------------|
//! | `d <= P`                                     | Menstrual  |
//! | `d <= max(13, floor(0.4 * L))`               | Follicular |
//! | `d <= min(follicular_end + 3, floor(0.6 L))` | Ovulatory  |
//! | otherwise                                    | Luteal     |
//!
//! For short cycles the ovulatory bound can fall below the follicular bound,
//! in which case the ovulatory window is empty.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, MILLIS_PER_DAY};

use super::phase::Phase;
use super::profile::{
    sanitize_cycle_length, sanitize_period_duration, CycleProfile, DateInput, MAX_CYCLE_LENGTH,
    MAX_PERIOD_DURATION, MIN_CYCLE_LENGTH, MIN_PERIOD_DURATION,
};
use super::validation::{ProfileIssue, ProfileValidation};

/// Last day of the follicular phase for a sanitized cycle length.
pub fn follicular_end(cycle_length: u32) -> u32 {
    // floor(L * 0.4) in integer arithmetic
    (cycle_length * 2 / 5).max(13)
}

/// Last day of the ovulatory phase for a sanitized cycle length.
pub fn ovulatory_end(cycle_length: u32) -> u32 {
    (follicular_end(cycle_length) + 3).min(cycle_length * 3 / 5)
}

/// Maps a cycle day to its phase.
///
/// Inputs are expected to be sanitized already.
pub fn phase_for_day(day: u32, cycle_length: u32, period_duration: u32) -> Phase {
    if day <= period_duration {
        Phase::Menstrual
    } else if day <= follicular_end(cycle_length) {
        Phase::Follicular
    } else if day <= ovulatory_end(cycle_length) {
        Phase::Ovulatory
    } else {
        Phase::Luteal
    }
}

/// Everything the calculator knows about a profile at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub cycle_day: u32,
    pub phase: Phase,
    pub next_period_date: Option<Timestamp>,
    pub days_until_next_period: Option<i64>,
}

/// Calculator for cycle day, phase and upcoming period.
#[derive(Debug, Clone, Copy)]
pub struct PhaseCalculator {
    now: Timestamp,
}

impl PhaseCalculator {
    /// Creates a calculator evaluated at the given instant.
    pub fn at(now: Timestamp) -> Self {
        Self { now }
    }

    /// Creates a calculator evaluated at the current moment.
    pub fn now() -> Self {
        Self::at(Timestamp::now())
    }

    /// The instant this calculator evaluates against.
    pub fn evaluated_at(&self) -> Timestamp {
        self.now
    }

    /// Whole days elapsed since the last period date, floored.
    ///
    /// Returns 0 when the date is absent or unparseable, and a negative
    /// number whenever the date lies after "now", even by a few hours.
    pub fn days_since(&self, last_period_date: Option<&DateInput>) -> i64 {
        match last_period_date.and_then(DateInput::parse) {
            Some(start) => self.now.millis_since(&start).div_euclid(MILLIS_PER_DAY),
            None => 0,
        }
    }

    /// Current 1-based day within the cycle, in `[1, cycle_length]`.
    pub fn current_cycle_day(&self, last_period_date: Option<&DateInput>, cycle_length: i32) -> u32 {
        let cycle_length = sanitize_cycle_length(cycle_length);
        let days = self.days_since(last_period_date);
        if days < 0 {
            return 1;
        }
        (days % i64::from(cycle_length)) as u32 + 1
    }

    /// Current phase of the cycle.
    pub fn current_phase(
        &self,
        last_period_date: Option<&DateInput>,
        cycle_length: i32,
        period_duration: i32,
    ) -> Phase {
        if self.days_since(last_period_date) < 0 {
            return Phase::Menstrual;
        }
        let day = self.current_cycle_day(last_period_date, cycle_length);
        phase_for_day(
            day,
            sanitize_cycle_length(cycle_length),
            sanitize_period_duration(period_duration),
        )
    }

    /// Expected start of the next period.
    ///
    /// `None` when the date is missing, unparseable or too close to the end
    /// of the representable range to move forward.
    pub fn next_period_date(
        &self,
        last_period_date: Option<&DateInput>,
        cycle_length: i32,
    ) -> Option<Timestamp> {
        let start = last_period_date.and_then(DateInput::parse)?;
        start.checked_add_days(i64::from(sanitize_cycle_length(cycle_length)))
    }

    /// Days until the next period, rounded up.
    pub fn days_until_next_period(
        &self,
        last_period_date: Option<&DateInput>,
        cycle_length: i32,
    ) -> Option<i64> {
        let next = self.next_period_date(last_period_date, cycle_length)?;
        let millis = next.millis_since(&self.now);
        Some((millis as f64 / MILLIS_PER_DAY as f64).ceil() as i64)
    }

    /// Current cycle day for a profile.
    pub fn cycle_day_for(&self, profile: &CycleProfile) -> u32 {
        self.current_cycle_day(profile.last_period_date.as_ref(), profile.cycle_length)
    }

    /// Current phase for a profile.
    pub fn phase_for(&self, profile: &CycleProfile) -> Phase {
        self.current_phase(
            profile.last_period_date.as_ref(),
            profile.cycle_length,
            profile.period_duration,
        )
    }

    /// Computes day, phase and next period in one pass.
    pub fn cycle_snapshot(&self, profile: &CycleProfile) -> CycleSnapshot {
        let last = profile.last_period_date.as_ref();
        CycleSnapshot {
            cycle_day: self.cycle_day_for(profile),
            phase: self.phase_for(profile),
            next_period_date: self.next_period_date(last, profile.cycle_length),
            days_until_next_period: self.days_until_next_period(last, profile.cycle_length),
        }
    }

    /// Checks a profile and reports every problem found.
    pub fn validate(&self, profile: &CycleProfile) -> ProfileValidation {
        let mut issues = Vec::new();

        match &profile.last_period_date {
            None => issues.push(ProfileIssue::MissingLastPeriodDate),
            Some(input) => match input.parse() {
                None => issues.push(ProfileIssue::InvalidLastPeriodDate),
                Some(start) if start.is_after(&self.now) => {
                    issues.push(ProfileIssue::LastPeriodInFuture)
                }
                Some(_) => {}
            },
        }

        if profile.cycle_length < MIN_CYCLE_LENGTH as i32
            || profile.cycle_length > MAX_CYCLE_LENGTH as i32
        {
            issues.push(ProfileIssue::CycleLengthOutOfRange {
                actual: profile.cycle_length,
            });
        }

        if profile.period_duration < MIN_PERIOD_DURATION as i32
            || profile.period_duration > MAX_PERIOD_DURATION as i32
        {
            issues.push(ProfileIssue::PeriodDurationOutOfRange {
                actual: profile.period_duration,
            });
        }

        if !profile.has_consistent_durations() {
            issues.push(ProfileIssue::PeriodNotShorterThanCycle {
                period: profile.period_duration,
                cycle: profile.cycle_length,
            });
        }

        ProfileValidation::from_issues(issues)
    }
}
