//! In-memory alert sink.
//!
//! Collects delivered alerts for reporting screens and tests.

use std::sync::{Mutex, PoisonError};

use crate::domain::monitoring::Alert;
use crate::ports::AlertSink;

/// Keeps every delivered alert in delivery order.
#[derive(Debug, Default)]
pub struct InMemoryAlertSink {
    alerts: Mutex<Vec<Alert>>,
}

impl InMemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All delivered alerts.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl AlertSink for InMemoryAlertSink {
    fn deliver(&self, alert: &Alert) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(alert.clone());
    }
}
