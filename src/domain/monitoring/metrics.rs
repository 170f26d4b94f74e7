//! Execution metrics aggregate.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, MILLIS_PER_DAY};

/// Maximum number of samples kept in the history ring.
pub const HISTORY_CAPACITY: usize = 100;

/// Samples older than this are pruned by cleanup.
pub const HISTORY_RETENTION_MS: i64 = MILLIS_PER_DAY;

/// One recorded pipeline execution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSample {
    pub duration_ms: f64,
    /// `None` when the execution did not consult a cache.
    pub cache_hit: Option<bool>,
    pub timestamp_ms: i64,
}

/// Running totals for pipeline executions.
///
/// `avg_duration_ms` is the arithmetic mean over all executions since the
/// last reset, not just those still in `history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub executions: u64,
    pub total_duration_ms: f64,
    pub avg_duration_ms: f64,
    pub slow_executions: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub errors: u64,
    pub last_error: Option<String>,
    /// Latest memory sample, if the caller supplies one.
    pub memory_usage: Option<f64>,
    pub history: VecDeque<ExecutionSample>,
    pub last_updated_ms: Option<i64>,
}

impl MetricsSnapshot {
    /// Folds one execution into the totals.
    ///
    /// An execution is slow when `duration_ms` exceeds `slow_threshold_ms`.
    pub fn record(
        &mut self,
        duration_ms: f64,
        cache_hit: Option<bool>,
        error: Option<&str>,
        slow_threshold_ms: f64,
        at: Timestamp,
    ) {
        self.executions += 1;
        self.total_duration_ms += duration_ms;
        self.avg_duration_ms = self.total_duration_ms / self.executions as f64;

        if duration_ms > slow_threshold_ms {
            self.slow_executions += 1;
        }

        match cache_hit {
            Some(true) => self.cache_hits += 1,
            Some(false) => self.cache_misses += 1,
            None => {}
        }

        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(ExecutionSample {
            duration_ms,
            cache_hit,
            timestamp_ms: at.as_unix_millis(),
        });

        if let Some(message) = error {
            self.errors += 1;
            self.last_error = Some(message.to_string());
        }

        self.last_updated_ms = Some(at.as_unix_millis());
    }

    /// Zeroes every counter and clears history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Drops history samples older than the retention window.
    ///
    /// Counters are left untouched. Returns the number of samples removed.
    pub fn prune_history(&mut self, now: Timestamp) -> usize {
        let cutoff = now.as_unix_millis() - HISTORY_RETENTION_MS;
        let before = self.history.len();
        self.history.retain(|sample| sample.timestamp_ms >= cutoff);
        before - self.history.len()
    }

    /// Errors per execution; `None` before the first execution.
    pub fn error_rate(&self) -> Option<f64> {
        ratio(self.errors, self.executions)
    }

    /// Slow executions per execution; `None` before the first execution.
    pub fn slow_query_rate(&self) -> Option<f64> {
        ratio(self.slow_executions, self.executions)
    }

    /// Hits per cache lookup; `None` before the first lookup.
    pub fn cache_hit_rate(&self) -> Option<f64> {
        ratio(self.cache_hits, self.cache_hits + self.cache_misses)
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> Timestamp {
        Timestamp::from_unix_millis(ms).unwrap()
    }

    #[test]
    fn record_updates_mean_and_counters() {
        let mut m = MetricsSnapshot::default();
        m.record(10.0, Some(true), None, 50.0, at(1_000));
        m.record(70.0, Some(false), Some("boom"), 50.0, at(2_000));

        assert_eq!(m.executions, 2);
        assert_eq!(m.total_duration_ms, 80.0);
        assert_eq!(m.avg_duration_ms, 40.0);
        assert_eq!(m.slow_executions, 1);
        assert_eq!(m.cache_hits, 1);
        assert_eq!(m.cache_misses, 1);
        assert_eq!(m.errors, 1);
        assert_eq!(m.last_error.as_deref(), Some("boom"));
        assert_eq!(m.last_updated_ms, Some(2_000));
    }

    #[test]
    fn uncached_executions_skip_hit_counters() {
        let mut m = MetricsSnapshot::default();
        m.record(10.0, None, None, 50.0, at(1_000));
        m.record(10.0, None, None, 50.0, at(2_000));

        assert_eq!(m.executions, 2);
        assert_eq!(m.cache_hits + m.cache_misses, 0);
        assert_eq!(m.cache_hit_rate(), None);
        assert_eq!(m.history[0].cache_hit, None);
    }

    #[test]
    fn slow_means_strictly_above_threshold() {
        let mut m = MetricsSnapshot::default();
        m.record(50.0, Some(true), None, 50.0, at(1));
        assert_eq!(m.slow_executions, 0);
    }

    #[test]
    fn history_is_capped_and_drops_oldest() {
        let mut m = MetricsSnapshot::default();
        for i in 0..(HISTORY_CAPACITY as i64 + 5) {
            m.record(1.0, Some(true), None, 50.0, at(i + 1));
        }
        assert_eq!(m.history.len(), HISTORY_CAPACITY);
        assert_eq!(m.history.front().unwrap().timestamp_ms, 6);
        assert_eq!(m.executions, HISTORY_CAPACITY as u64 + 5);
    }

    #[test]
    fn rates_are_none_without_data() {
        let m = MetricsSnapshot::default();
        assert_eq!(m.error_rate(), None);
        assert_eq!(m.cache_hit_rate(), None);
        assert_eq!(m.slow_query_rate(), None);
    }

    #[test]
    fn prune_history_keeps_counters() {
        let day = HISTORY_RETENTION_MS;
        let mut m = MetricsSnapshot::default();
        m.record(1.0, Some(true), None, 50.0, at(1_000));
        m.record(1.0, Some(true), None, 50.0, at(day + 5_000));

        let removed = m.prune_history(at(day + 2_000));
        assert_eq!(removed, 1);
        assert_eq!(m.history.len(), 1);
        assert_eq!(m.executions, 2);
    }

    #[test]
    fn reset_clears_everything() {
        let mut m = MetricsSnapshot::default();
        m.record(90.0, Some(false), Some("x"), 50.0, at(1));
        m.memory_usage = Some(12.0);
        m.reset();
        assert_eq!(m, MetricsSnapshot::default());
    }

    #[test]
    fn snapshot_exports_as_plain_json() {
        let mut m = MetricsSnapshot::default();
        m.record(5.0, Some(true), None, 50.0, at(42));
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["executions"], 1);
        assert_eq!(json["history"][0]["timestamp_ms"], 42);
    }
}
