//! Health evaluation of live metrics against thresholds.
//!
//! | Violation         | Condition                       | Penalty |
//! |-------------------|---------------------------------|---------|
//! | `SlowPipeline`    | avg duration > execution limit  | 20      |
//! | `LowCacheHitRate` | hit rate < minimum              | 15      |
//! | `HighErrorRate`   | error rate > maximum            | 30      |
//! | `SlowQueries`     | slow-execution rate > maximum   | 15      |
//!
//! A high error rate makes the pipeline critical; any other violation makes
//! it a warning. Rates with no underlying data never violate.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

use super::metrics::MetricsSnapshot;
use super::thresholds::PerformanceThresholds;

/// Overall pipeline health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A threshold the live metrics currently break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdViolation {
    SlowPipeline,
    LowCacheHitRate,
    HighErrorRate,
    SlowQueries,
}

impl ThresholdViolation {
    /// Points subtracted from the health score.
    pub fn penalty(&self) -> u32 {
        match self {
            ThresholdViolation::SlowPipeline => 20,
            ThresholdViolation::LowCacheHitRate => 15,
            ThresholdViolation::HighErrorRate => 30,
            ThresholdViolation::SlowQueries => 15,
        }
    }

    /// Fixed advice for this violation.
    pub fn recommendation(&self) -> &'static str {
        match self {
            ThresholdViolation::SlowPipeline => {
                "Optimize pipeline execution: average duration exceeds the target"
            }
            ThresholdViolation::LowCacheHitRate => {
                "Improve cache strategy: hit rate is below the target"
            }
            ThresholdViolation::HighErrorRate => {
                "Investigate errors: error rate exceeds the acceptable limit"
            }
            ThresholdViolation::SlowQueries => {
                "Optimize slow queries: too many executions exceed the time limit"
            }
        }
    }
}

/// Violations in recommendation order.
pub fn violations(
    metrics: &MetricsSnapshot,
    thresholds: &PerformanceThresholds,
) -> Vec<ThresholdViolation> {
    let mut found = Vec::new();

    if metrics.executions > 0 && metrics.avg_duration_ms > thresholds.pipeline_execution_ms {
        found.push(ThresholdViolation::SlowPipeline);
    }
    if metrics
        .cache_hit_rate()
        .is_some_and(|rate| rate < thresholds.cache_hit_rate)
    {
        found.push(ThresholdViolation::LowCacheHitRate);
    }
    if metrics
        .error_rate()
        .is_some_and(|rate| rate > thresholds.error_rate)
    {
        found.push(ThresholdViolation::HighErrorRate);
    }
    if metrics
        .slow_query_rate()
        .is_some_and(|rate| rate > thresholds.slow_query_rate)
    {
        found.push(ThresholdViolation::SlowQueries);
    }

    found
}

/// Status implied by a set of violations.
pub fn status_for(violations: &[ThresholdViolation]) -> HealthStatus {
    if violations.contains(&ThresholdViolation::HighErrorRate) {
        HealthStatus::Critical
    } else if violations.is_empty() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Warning
    }
}

/// Score in [0, 100] implied by a set of violations.
pub fn score_for(violations: &[ThresholdViolation]) -> u32 {
    let penalty: u32 = violations.iter().map(ThresholdViolation::penalty).sum();
    100u32.saturating_sub(penalty)
}

/// Health summary for external reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub score: u32,
    pub recommendations: Vec<String>,
    pub violations: Vec<ThresholdViolation>,
    pub memory_usage: Option<f64>,
    pub memory_over_threshold: bool,
    pub evaluated_at: Timestamp,
}

impl HealthReport {
    /// Evaluates metrics against thresholds.
    pub fn evaluate(
        metrics: &MetricsSnapshot,
        thresholds: &PerformanceThresholds,
        at: Timestamp,
    ) -> Self {
        let found = violations(metrics, thresholds);
        Self {
            status: status_for(&found),
            score: score_for(&found),
            recommendations: found
                .iter()
                .map(|v| v.recommendation().to_string())
                .collect(),
            memory_usage: metrics.memory_usage,
            memory_over_threshold: metrics
                .memory_usage
                .is_some_and(|usage| usage > thresholds.memory_usage),
            violations: found,
            evaluated_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> Timestamp {
        Timestamp::from_unix_millis(1_000).unwrap()
    }

    fn metrics(samples: &[(f64, bool, bool)]) -> MetricsSnapshot {
        let mut m = MetricsSnapshot::default();
        for (duration, hit, failed) in samples {
            m.record(*duration, Some(*hit), failed.then_some("err"), 50.0, at());
        }
        m
    }

    #[test]
    fn fresh_metrics_are_healthy() {
        let report = HealthReport::evaluate(
            &MetricsSnapshot::default(),
            &PerformanceThresholds::default(),
            at(),
        );
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.score, 100);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn all_violations_accumulate_penalties_in_order() {
        let m = metrics(&[(200.0, false, true), (200.0, false, false)]);
        let found = violations(&m, &PerformanceThresholds::default());
        assert_eq!(
            found,
            vec![
                ThresholdViolation::SlowPipeline,
                ThresholdViolation::LowCacheHitRate,
                ThresholdViolation::HighErrorRate,
                ThresholdViolation::SlowQueries,
            ]
        );
        assert_eq!(score_for(&found), 20);
        assert_eq!(status_for(&found), HealthStatus::Critical);
    }

    #[test]
    fn memory_is_reported_but_not_scored() {
        let mut m = MetricsSnapshot::default();
        m.memory_usage = Some(75.0);
        let report = HealthReport::evaluate(&m, &PerformanceThresholds::default(), at());
        assert!(report.memory_over_threshold);
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.score, 100);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Critical).unwrap(),
            "\"critical\""
        );
    }
}
