//! MemoryProbe port - Caller-defined memory usage readings.

/// Port for sampling memory usage.
///
/// Units are defined by the caller and compared against the configured
/// memory threshold as-is.
pub trait MemoryProbe: Send + Sync {
    /// Current usage, or `None` if unavailable.
    fn sample(&self) -> Option<f64>;
}
