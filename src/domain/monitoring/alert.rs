//! Alerts and their deduplication.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{AlertId, Timestamp};

/// Alerts of one kind fired within this window are suppressed.
pub const ALERT_DEDUP_WINDOW_MS: i64 = 60_000;

/// What an alert is about. Deduplication is per kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SlowExecution,
    ExecutionError,
    HealthDegraded,
    MemoryUsage,
    InitializationFailure,
    Custom(String),
}

impl AlertKind {
    pub fn as_str(&self) -> &str {
        match self {
            AlertKind::SlowExecution => "slow_execution",
            AlertKind::ExecutionError => "execution_error",
            AlertKind::HealthDegraded => "health_degraded",
            AlertKind::MemoryUsage => "memory_usage",
            AlertKind::InitializationFailure => "initialization_failure",
            AlertKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Info => "info",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        }
    }
}

/// An alert surfaced to the alert sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub level: AlertLevel,
    pub message: String,
    pub data: Value,
    pub timestamp: Timestamp,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        level: AlertLevel,
        message: impl Into<String>,
        data: Value,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: AlertId::new(),
            kind,
            level,
            message: message.into(),
            data,
            timestamp,
        }
    }
}

/// Remembers when each alert kind last fired.
#[derive(Debug, Clone)]
pub struct AlertDeduplicator {
    window_ms: i64,
    last_fired: HashMap<AlertKind, Timestamp>,
    suppressed: u64,
}

impl Default for AlertDeduplicator {
    fn default() -> Self {
        Self::new(ALERT_DEDUP_WINDOW_MS)
    }
}

impl AlertDeduplicator {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            last_fired: HashMap::new(),
            suppressed: 0,
        }
    }

    /// Returns true and records the firing if `kind` has not fired within
    /// the window; otherwise counts a suppression.
    pub fn admit(&mut self, kind: &AlertKind, now: Timestamp) -> bool {
        if let Some(last) = self.last_fired.get(kind) {
            if now.millis_since(last) < self.window_ms {
                self.suppressed += 1;
                return false;
            }
        }
        self.last_fired.insert(kind.clone(), now);
        true
    }

    /// Number of alerts suppressed so far.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    /// Forgets all firing history.
    pub fn clear(&mut self) {
        self.last_fired.clear();
        self.suppressed = 0;
    }
}
