//! AlertSink port - Receives alerts that passed deduplication.

use crate::domain::monitoring::Alert;

/// Port for surfacing alerts to display or reporting.
///
/// Delivery is fire-and-forget; sinks must not block the caller.
pub trait AlertSink: Send + Sync {
    fn deliver(&self, alert: &Alert);
}
