//! Cycle profile supplied by the profile provider.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Shortest cycle length the calculator works with, in days.
pub const MIN_CYCLE_LENGTH: u32 = 21;
/// Longest cycle length the calculator works with, in days.
pub const MAX_CYCLE_LENGTH: u32 = 45;
/// Shortest period duration, in days.
pub const MIN_PERIOD_DURATION: u32 = 2;
/// Longest period duration, in days.
pub const MAX_PERIOD_DURATION: u32 = 10;

pub const DEFAULT_CYCLE_LENGTH: i32 = 28;
pub const DEFAULT_PERIOD_DURATION: i32 = 5;

/// A date as received from the outside: ISO-8601 text or epoch milliseconds.
///
/// Parsing never fails loudly; anything unreadable is treated as "no data".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    EpochMillis(i64),
    Iso(String),
}

impl DateInput {
    /// Resolves the input to a timestamp, or `None` when unparseable.
    pub fn parse(&self) -> Option<Timestamp> {
        match self {
            DateInput::EpochMillis(millis) => Timestamp::from_unix_millis(*millis),
            DateInput::Iso(raw) => parse_iso(raw),
        }
    }
}

impl From<Timestamp> for DateInput {
    fn from(ts: Timestamp) -> Self {
        DateInput::EpochMillis(ts.as_unix_millis())
    }
}

impl From<&str> for DateInput {
    fn from(raw: &str) -> Self {
        DateInput::Iso(raw.to_string())
    }
}

impl From<String> for DateInput {
    fn from(raw: String) -> Self {
        DateInput::Iso(raw)
    }
}

/// Accepts RFC 3339, naive date-times (read as UTC) and plain dates.
fn parse_iso(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(Timestamp::from_datetime(dt.with_timezone(&Utc)));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Timestamp::from_datetime(naive.and_utc()));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(Timestamp::from_date)
}

/// Clamps a raw cycle length into the supported range.
pub fn sanitize_cycle_length(raw: i32) -> u32 {
    raw.clamp(MIN_CYCLE_LENGTH as i32, MAX_CYCLE_LENGTH as i32) as u32
}

/// Clamps a raw period duration into the supported range.
pub fn sanitize_period_duration(raw: i32) -> u32 {
    raw.clamp(MIN_PERIOD_DURATION as i32, MAX_PERIOD_DURATION as i32) as u32
}

/// User cycle settings.
///
/// Values are stored as received; clamping happens at calculation time and
/// out-of-range values are only surfaced by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleProfile {
    #[serde(default)]
    pub last_period_date: Option<DateInput>,
    #[serde(default = "default_cycle_length")]
    pub cycle_length: i32,
    #[serde(default = "default_period_duration")]
    pub period_duration: i32,
}

fn default_cycle_length() -> i32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_period_duration() -> i32 {
    DEFAULT_PERIOD_DURATION
}

impl Default for CycleProfile {
    fn default() -> Self {
        Self {
            last_period_date: None,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            period_duration: DEFAULT_PERIOD_DURATION,
        }
    }
}

impl CycleProfile {
    /// Creates a profile from raw values.
    pub fn new(last_period_date: Option<DateInput>, cycle_length: i32, period_duration: i32) -> Self {
        Self {
            last_period_date,
            cycle_length,
            period_duration,
        }
    }

    /// Sets the last period start date.
    pub fn with_last_period(mut self, date: impl Into<DateInput>) -> Self {
        self.last_period_date = Some(date.into());
        self
    }

    /// Parsed last period date, if present and readable.
    pub fn last_period(&self) -> Option<Timestamp> {
        self.last_period_date.as_ref().and_then(DateInput::parse)
    }

    /// Cycle length clamped into [21, 45].
    pub fn sanitized_cycle_length(&self) -> u32 {
        sanitize_cycle_length(self.cycle_length)
    }

    /// Period duration clamped into [2, 10].
    pub fn sanitized_period_duration(&self) -> u32 {
        sanitize_period_duration(self.period_duration)
    }

    /// Whether the period is shorter than the cycle, as entered.
    pub fn has_consistent_durations(&self) -> bool {
        self.period_duration < self.cycle_length
    }
}
