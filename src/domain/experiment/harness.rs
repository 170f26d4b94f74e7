//! Experiment Harness - Head-to-head comparison of estimation strategies.
//!
//! Each run evaluates the calendar prediction and the observation estimate,
//! times both, and scores them:
//!
//! ```text
//! score = max(0, 1 - duration_ms / 10) * 0.3 + accuracy / 100 * 0.7
//! ```
//!
//! The observation score gets a 1.1 multiplier when its accuracy exceeds 70.
//! The higher score wins; equal scores go to the predictive strategy.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use crate::domain::cycle::{CycleProfile, PhaseCalculator};
use crate::domain::observation::{EstimationMode, Observation, ObservationEstimator};

use super::result::{
    CandidateResult, ExperimentMetadata, ExperimentOutcome, ExperimentReport, ExperimentScores,
    SkipReason,
};
use super::settings::HarnessSettings;
use super::stats::ExperimentStats;

const TIME_WEIGHT: f64 = 0.3;
const ACCURACY_WEIGHT: f64 = 0.7;
/// Duration at which the time component of the score reaches zero.
const TIME_BUDGET_MS: f64 = 10.0;
const OBSERVATION_BONUS_ACCURACY: f64 = 70.0;
const OBSERVATION_BONUS: f64 = 1.1;

/// Weighted score of a strategy from its duration and accuracy.
pub fn score(duration_ms: f64, accuracy: f64) -> f64 {
    let normalized_time = (1.0 - duration_ms / TIME_BUDGET_MS).max(0.0);
    let normalized_accuracy = accuracy / 100.0;
    normalized_time * TIME_WEIGHT + normalized_accuracy * ACCURACY_WEIGHT
}

/// Score of a strategy including the observation bonus.
pub fn mode_score(mode: EstimationMode, duration_ms: f64, accuracy: f64) -> f64 {
    let base = score(duration_ms, accuracy);
    match mode {
        EstimationMode::Observation if accuracy > OBSERVATION_BONUS_ACCURACY => {
            base * OBSERVATION_BONUS
        }
        _ => base,
    }
}

/// Picks the winning strategy; ties favour the predictive one.
pub fn decide_winner(predictive_score: f64, observation_score: f64) -> EstimationMode {
    if observation_score > predictive_score {
        EstimationMode::Observation
    } else {
        EstimationMode::Predictive
    }
}

/// Runs experiments and keeps A/B counters.
#[derive(Debug, Default)]
pub struct ExperimentHarness {
    settings: HarnessSettings,
    stats: Mutex<ExperimentStats>,
}

impl ExperimentHarness {
    pub fn new(settings: HarnessSettings) -> Self {
        Self {
            settings,
            stats: Mutex::new(ExperimentStats::default()),
        }
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Compares both strategies for the given profile and observations.
    pub fn run(
        &self,
        calculator: &PhaseCalculator,
        profile: &CycleProfile,
        observations: &[Observation],
    ) -> ExperimentOutcome {
        if observations.len() < self.settings.min_observations {
            self.with_stats(ExperimentStats::record_skip);
            return ExperimentOutcome::Skipped {
                reason: SkipReason::InsufficientObservations,
                fallback_phase: calculator.phase_for(profile),
            };
        }

        let estimator = ObservationEstimator::new(self.settings.min_observations);

        let started = Instant::now();
        let predictive_phase = calculator.phase_for(profile);
        let predictive_ms = elapsed_ms(started);

        let started = Instant::now();
        let observation_phase = estimator.estimate_phase(calculator, profile, observations);
        let observation_ms = elapsed_ms(started);

        let predictive_accuracy = self.settings.predictive_baseline_accuracy;
        let observation_accuracy = ObservationEstimator::accuracy(observations, predictive_phase);

        let scores = ExperimentScores {
            predictive: mode_score(EstimationMode::Predictive, predictive_ms, predictive_accuracy),
            observation: mode_score(
                EstimationMode::Observation,
                observation_ms,
                observation_accuracy,
            ),
        };

        let winner_mode = decide_winner(scores.predictive, scores.observation);
        let winner_phase = match winner_mode {
            EstimationMode::Predictive => predictive_phase,
            EstimationMode::Observation => observation_phase,
        };

        let confidence = ObservationEstimator::confidence(observations);
        self.with_stats(|stats| stats.record_win(winner_mode));

        tracing::debug!(
            winner = winner_mode.as_str(),
            predictive_score = scores.predictive,
            observation_score = scores.observation,
            "Experiment completed"
        );

        ExperimentOutcome::Completed(ExperimentReport {
            winner_mode,
            winner_phase,
            scores,
            predictive: CandidateResult {
                phase: predictive_phase,
                duration_ms: predictive_ms,
                accuracy: predictive_accuracy,
            },
            observation: CandidateResult {
                phase: observation_phase,
                duration_ms: observation_ms,
                accuracy: observation_accuracy,
            },
            metadata: ExperimentMetadata {
                observations_count: observations.len(),
                confidence,
                confident: confidence / 100.0 >= self.settings.confidence_threshold,
                duration_ms: predictive_ms + observation_ms,
            },
        })
    }

    /// Snapshot of the A/B counters.
    pub fn stats(&self) -> ExperimentStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Zeroes the A/B counters.
    pub fn reset_stats(&self) {
        self.with_stats(|stats| *stats = ExperimentStats::default());
    }

    fn with_stats(&self, f: impl FnOnce(&mut ExperimentStats)) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut stats);
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
