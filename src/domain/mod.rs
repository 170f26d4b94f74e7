//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, identifiers)
//! - `cycle` - Calendar phase arithmetic and profile validation
//! - `observation` - Logged observations and the adaptive estimator
//! - `experiment` - Strategy comparison and A/B counters
//! - `monitoring` - Metrics, thresholds, health and alerts

pub mod cycle;
pub mod experiment;
pub mod foundation;
pub mod monitoring;
pub mod observation;
