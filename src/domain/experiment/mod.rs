//! Experiment module - Compares calendar and observation strategies and
//! keeps A/B counters across runs.

mod harness;
mod result;
mod settings;
mod stats;

pub use crate::domain::observation::EstimationMode;
pub use harness::{decide_winner, mode_score, score, ExperimentHarness};
pub use result::{
    CandidateResult, ExperimentMetadata, ExperimentOutcome, ExperimentReport, ExperimentScores,
    SkipReason,
};
pub use settings::{
    HarnessSettings, PREDICTIVE_BASELINE_ACCURACY, RECOMMENDED_CONFIDENCE_THRESHOLD,
    RECOMMENDED_MIN_OBSERVATIONS,
};
pub use stats::ExperimentStats;
