//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Returns the timestamp as Unix milliseconds.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Midnight UTC of the given calendar date.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        date.and_hms_opt(0, 0, 0).map(|dt| Self(dt.and_utc()))
    }

    /// Calendar date (UTC) of this timestamp.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Milliseconds elapsed from `other` to `self`; negative if `other` is later.
    pub fn millis_since(&self, other: &Timestamp) -> i64 {
        self.duration_since(other).num_milliseconds()
    }

    /// Creates a new timestamp by adding the specified number of days.
    ///
    /// Negative values subtract days.
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Like `add_days`, but `None` when the result leaves chrono's range.
    pub fn checked_add_days(&self, days: i64) -> Option<Self> {
        Duration::try_days(days)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
    }

    /// Creates a new timestamp by subtracting the specified number of days.
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    /// Creates a new timestamp by adding the specified number of milliseconds.
    pub fn plus_millis(&self, millis: i64) -> Self {
        Self(self.0 + Duration::milliseconds(millis))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::thread::sleep;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn timestamp_is_before_and_after_work() {
        let ts1 = Timestamp::now();
        sleep(std::time::Duration::from_millis(5));
        let ts2 = Timestamp::now();

        assert!(ts1.is_before(&ts2));
        assert!(ts2.is_after(&ts1));
        assert!(ts1 < ts2);
    }

    #[test]
    fn timestamp_from_unix_millis_works() {
        // 2024-01-15T00:00:00Z
        let ts = Timestamp::from_unix_millis(1_705_276_800_000).unwrap();
        assert_eq!(ts.as_datetime().year(), 2024);
        assert_eq!(ts.as_datetime().month(), 1);
        assert_eq!(ts.as_datetime().day(), 15);
        assert_eq!(ts.as_unix_millis(), 1_705_276_800_000);
    }

    #[test]
    fn timestamp_from_unix_millis_rejects_out_of_range() {
        assert!(Timestamp::from_unix_millis(i64::MAX).is_none());
    }

    #[test]
    fn millis_since_is_signed() {
        let base = Timestamp::from_unix_millis(10_000).unwrap();
        let later = base.plus_millis(2_500);
        assert_eq!(later.millis_since(&base), 2_500);
        assert_eq!(base.millis_since(&later), -2_500);
    }

    #[test]
    fn add_and_minus_days_are_inverse() {
        let ts = Timestamp::from_unix_millis(1_705_276_800_000).unwrap();
        assert_eq!(ts.add_days(3).minus_days(3), ts);
        assert_eq!(ts.add_days(1).millis_since(&ts), MILLIS_PER_DAY);
    }

    #[test]
    fn checked_add_days_stops_at_range_end() {
        let ts = Timestamp::from_unix_millis(1_705_276_800_000).unwrap();
        assert_eq!(ts.checked_add_days(28), Some(ts.add_days(28)));

        let edge = Timestamp::from_unix_millis(8_210_266_876_000_000).unwrap();
        assert!(edge.checked_add_days(28).is_none());
    }

    #[test]
    fn from_date_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let ts = Timestamp::from_date(date).unwrap();
        assert_eq!(ts.date(), date);
        assert_eq!(ts.as_unix_millis() % MILLIS_PER_DAY, 0);
    }

    #[test]
    fn timestamp_serializes_to_json() {
        let ts = Timestamp::from_unix_millis(1_705_276_800_000).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15"));
    }
}
