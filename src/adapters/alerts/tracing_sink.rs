//! Alert sink that writes alerts to the tracing subscriber.

use crate::domain::monitoring::{Alert, AlertLevel};
use crate::ports::AlertSink;

/// Logs each alert at a level matching its severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn deliver(&self, alert: &Alert) {
        match alert.level {
            AlertLevel::Info => tracing::info!(
                alert_id = %alert.id,
                kind = %alert.kind,
                data = %alert.data,
                "{}",
                alert.message
            ),
            AlertLevel::Warning => tracing::warn!(
                alert_id = %alert.id,
                kind = %alert.kind,
                data = %alert.data,
                "{}",
                alert.message
            ),
            AlertLevel::Critical => tracing::error!(
                alert_id = %alert.id,
                kind = %alert.kind,
                data = %alert.data,
                "{}",
                alert.message
            ),
        }
    }
}
