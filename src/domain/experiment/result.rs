//! Experiment outcomes.

use serde::{Deserialize, Serialize};

use crate::domain::cycle::Phase;
use crate::domain::observation::EstimationMode;

/// Why an experiment could not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InsufficientObservations,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InsufficientObservations => "insufficient_observations",
        }
    }
}

/// Score per strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentScores {
    pub predictive: f64,
    pub observation: f64,
}

/// Phase and measurements of one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub phase: Phase,
    pub duration_ms: f64,
    pub accuracy: f64,
}

/// Context about a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    pub observations_count: usize,
    /// Observation confidence in [0, 100].
    pub confidence: f64,
    /// Whether `confidence` reaches the configured threshold.
    pub confident: bool,
    /// Combined duration of both strategies.
    pub duration_ms: f64,
}

/// Result of a completed experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub winner_mode: EstimationMode,
    pub winner_phase: Phase,
    pub scores: ExperimentScores,
    pub predictive: CandidateResult,
    pub observation: CandidateResult,
    pub metadata: ExperimentMetadata,
}

/// Outcome of [`ExperimentHarness::run`](super::ExperimentHarness::run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExperimentOutcome {
    Completed(ExperimentReport),
    Skipped {
        reason: SkipReason,
        fallback_phase: Phase,
    },
}

impl ExperimentOutcome {
    /// Returns true if both strategies were evaluated.
    pub fn can_run(&self) -> bool {
        matches!(self, ExperimentOutcome::Completed(_))
    }

    /// The phase to use: the winner's, or the fallback when skipped.
    pub fn phase(&self) -> Phase {
        match self {
            ExperimentOutcome::Completed(report) => report.winner_phase,
            ExperimentOutcome::Skipped { fallback_phase, .. } => *fallback_phase,
        }
    }

    /// The report, if the experiment ran.
    pub fn report(&self) -> Option<&ExperimentReport> {
        match self {
            ExperimentOutcome::Completed(report) => Some(report),
            ExperimentOutcome::Skipped { .. } => None,
        }
    }
}
