//! Cycle Insight - Menstrual-cycle phase estimation behind a cached,
//! monitored personalization pipeline.
//!
//! The calendar estimate comes from `domain::cycle::PhaseCalculator`; with
//! enough logged observations `domain::observation::ObservationEstimator`
//! refines it, and `domain::experiment::ExperimentHarness` compares the two.
//! `application::PipelineInitializer` wires the cache, harness and monitor
//! together at startup.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
