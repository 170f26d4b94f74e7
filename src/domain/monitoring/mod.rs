//! Monitoring module - Execution metrics, health evaluation and alert
//! deduplication.
//!
//! Everything here is plain data plus pure functions; the shared, locked
//! instance lives in `application::PipelineMonitor`.

mod alert;
mod health;
mod metrics;
mod thresholds;

pub use alert::{Alert, AlertDeduplicator, AlertKind, AlertLevel, ALERT_DEDUP_WINDOW_MS};
pub use health::{score_for, status_for, violations, HealthReport, HealthStatus, ThresholdViolation};
pub use metrics::{ExecutionSample, MetricsSnapshot, HISTORY_CAPACITY, HISTORY_RETENTION_MS};
pub use thresholds::PerformanceThresholds;
