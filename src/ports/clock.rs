//! Clock port - Source of "now" for TTLs, windows and calendar arithmetic.

use crate::domain::foundation::Timestamp;

/// Port for reading the current time.
///
/// Injected everywhere time matters so that expiry, deduplication windows
/// and phase calculations can be tested deterministically.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}
