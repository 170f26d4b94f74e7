//! A/B counters kept by the harness.

use serde::{Deserialize, Serialize};

use crate::domain::observation::EstimationMode;

/// Running totals across experiment runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentStats {
    pub runs: u64,
    pub skipped: u64,
    pub predictive_wins: u64,
    pub observation_wins: u64,
}

impl ExperimentStats {
    /// Counts a completed run won by `mode`.
    pub fn record_win(&mut self, mode: EstimationMode) {
        self.runs += 1;
        match mode {
            EstimationMode::Predictive => self.predictive_wins += 1,
            EstimationMode::Observation => self.observation_wins += 1,
        }
    }

    /// Counts a run that could not proceed.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Share of completed runs won by the observation strategy.
    pub fn observation_win_rate(&self) -> Option<f64> {
        if self.runs == 0 {
            None
        } else {
            Some(self.observation_wins as f64 / self.runs as f64)
        }
    }
}
