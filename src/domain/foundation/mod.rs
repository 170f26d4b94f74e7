//! Foundation module - Shared domain primitives.
//!
//! Contains value objects and identifiers used across the cycle,
//! observation, experiment and monitoring modules.

mod ids;
mod timestamp;

pub use ids::AlertId;
pub use timestamp::{Timestamp, MILLIS_PER_DAY};
