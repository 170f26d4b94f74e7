//! PipelineMonitor - Shared metrics aggregate with health evaluation and
//! deduplicated alerting.
//!
//! One monitor is constructed at startup and handed to every caller by
//! `Arc`. All state sits behind a single mutex; alerts are delivered to the
//! sink after the lock is released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{json, Value};

use crate::domain::foundation::Timestamp;
use crate::domain::monitoring::{
    Alert, AlertDeduplicator, AlertKind, AlertLevel, HealthReport, HealthStatus, MetricsSnapshot,
    PerformanceThresholds, ALERT_DEDUP_WINDOW_MS,
};
use crate::ports::{AlertSink, Clock};

struct MonitorState {
    metrics: MetricsSnapshot,
    thresholds: PerformanceThresholds,
    dedup: AlertDeduplicator,
    last_alert: Option<Alert>,
}

/// Aggregates pipeline executions and raises alerts.
pub struct PipelineMonitor {
    state: Mutex<MonitorState>,
    tracking: AtomicBool,
    sink: Arc<dyn AlertSink>,
    clock: Arc<dyn Clock>,
}

impl PipelineMonitor {
    pub fn new(
        thresholds: PerformanceThresholds,
        sink: Arc<dyn AlertSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: Mutex::new(MonitorState {
                metrics: MetricsSnapshot::default(),
                thresholds,
                dedup: AlertDeduplicator::new(ALERT_DEDUP_WINDOW_MS),
                last_alert: None,
            }),
            tracking: AtomicBool::new(true),
            sink,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Turns execution recording on or off. Alerts and health stay available.
    pub fn set_performance_tracking(&self, enabled: bool) {
        self.tracking.store(enabled, Ordering::Relaxed);
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.load(Ordering::Relaxed)
    }

    /// Folds one pipeline execution into the metrics.
    ///
    /// `cache_hit` is `None` when no cache was consulted; such executions
    /// leave the hit rate untouched. Slow executions and errors raise alerts, subject to deduplication.
    pub fn record_execution(&self, duration_ms: f64, cache_hit: Option<bool>, error: Option<&str>) {
        if !self.is_tracking() {
            return;
        }

        let now = self.clock.now();
        let slow_limit = {
            let mut state = self.lock();
            let limit = state.thresholds.pipeline_execution_ms;
            state.metrics.record(duration_ms, cache_hit, error, limit, now);
            limit
        };

        if duration_ms > slow_limit {
            self.alert(
                AlertKind::SlowExecution,
                AlertLevel::Warning,
                format!("Pipeline execution took {duration_ms:.1}ms (limit {slow_limit}ms)"),
                json!({ "duration_ms": duration_ms, "limit_ms": slow_limit }),
            );
        }

        if let Some(message) = error {
            self.alert(
                AlertKind::ExecutionError,
                AlertLevel::Critical,
                format!("Pipeline execution failed: {message}"),
                json!({ "error": message }),
            );
        }
    }

    /// Stores a caller-supplied memory reading, alerting when it exceeds the
    /// memory threshold.
    pub fn record_memory_usage(&self, usage: f64) {
        let limit = {
            let mut state = self.lock();
            state.metrics.memory_usage = Some(usage);
            state.thresholds.memory_usage
        };

        if usage > limit {
            self.alert(
                AlertKind::MemoryUsage,
                AlertLevel::Warning,
                format!("Memory usage {usage} exceeds {limit}"),
                json!({ "memory_usage": usage, "limit": limit }),
            );
        }
    }

    /// Raises an alert unless one of the same kind fired within the last
    /// minute. Returns whether the alert reached the sink.
    pub fn alert(
        &self,
        kind: AlertKind,
        level: AlertLevel,
        message: impl Into<String>,
        data: Value,
    ) -> bool {
        let now = self.clock.now();
        let alert = {
            let mut state = self.lock();
            if !state.dedup.admit(&kind, now) {
                tracing::debug!(kind = %kind, "Alert suppressed");
                return false;
            }
            let alert = Alert::new(kind, level, message, data, now);
            state.last_alert = Some(alert.clone());
            alert
        };

        self.sink.deliver(&alert);
        true
    }

    pub fn health_report(&self) -> HealthReport {
        let now = self.clock.now();
        let state = self.lock();
        HealthReport::evaluate(&state.metrics, &state.thresholds, now)
    }

    pub fn health(&self) -> HealthStatus {
        self.health_report().status
    }

    /// Score in [0, 100].
    pub fn health_score(&self) -> u32 {
        self.health_report().score
    }

    pub fn recommendations(&self) -> Vec<String> {
        self.health_report().recommendations
    }

    /// Zeroes all counters and clears history.
    pub fn reset(&self) {
        self.lock().metrics.reset();
    }

    /// Prunes history older than 24 hours; counters are kept.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let removed = self.lock().metrics.prune_history(now);
        if removed > 0 {
            tracing::debug!(removed, "Pruned execution history");
        }
        removed
    }

    pub fn apply_thresholds(&self, thresholds: PerformanceThresholds) {
        self.lock().thresholds = thresholds;
    }

    pub fn thresholds(&self) -> PerformanceThresholds {
        self.lock().thresholds
    }

    /// Copy of the current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.lock().metrics.clone()
    }

    /// Current metrics as plain JSON for export.
    pub fn export(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self.snapshot())
    }

    pub fn last_alert(&self) -> Option<Alert> {
        self.lock().last_alert.clone()
    }

    /// Alerts dropped by deduplication since creation.
    pub fn suppressed_alerts(&self) -> u64 {
        self.lock().dedup.suppressed()
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

impl std::fmt::Debug for PipelineMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("PipelineMonitor")
            .field("metrics", &state.metrics)
            .field("thresholds", &state.thresholds)
            .finish_non_exhaustive()
    }
}
