//! Harness settings.

use serde::{Deserialize, Serialize};

use crate::domain::observation::MIN_OBSERVATIONS;

/// Fixed theoretical accuracy assumed for calendar predictions.
pub const PREDICTIVE_BASELINE_ACCURACY: f64 = 85.0;

/// Lowest minimum-observation setting considered statistically meaningful.
pub const RECOMMENDED_MIN_OBSERVATIONS: usize = 5;

/// Lowest confidence threshold considered meaningful.
pub const RECOMMENDED_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Tunables for the experiment harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessSettings {
    /// Observations required before an experiment runs.
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,

    /// Confidence (as a fraction) above which an observation estimate is
    /// considered trustworthy.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Accuracy credited to the calendar strategy.
    #[serde(default = "default_predictive_accuracy")]
    pub predictive_baseline_accuracy: f64,
}

fn default_min_observations() -> usize {
    MIN_OBSERVATIONS
}

fn default_confidence_threshold() -> f64 {
    RECOMMENDED_CONFIDENCE_THRESHOLD
}

fn default_predictive_accuracy() -> f64 {
    PREDICTIVE_BASELINE_ACCURACY
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            min_observations: MIN_OBSERVATIONS,
            confidence_threshold: RECOMMENDED_CONFIDENCE_THRESHOLD,
            predictive_baseline_accuracy: PREDICTIVE_BASELINE_ACCURACY,
        }
    }
}

impl HarnessSettings {
    /// Non-fatal concerns about these settings.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.min_observations < RECOMMENDED_MIN_OBSERVATIONS {
            warnings.push(format!(
                "min_observations {} is below {}, results will be noisy",
                self.min_observations, RECOMMENDED_MIN_OBSERVATIONS
            ));
        }
        if self.confidence_threshold < RECOMMENDED_CONFIDENCE_THRESHOLD {
            warnings.push(format!(
                "confidence_threshold {} is below {}",
                self.confidence_threshold, RECOMMENDED_CONFIDENCE_THRESHOLD
            ));
        }
        warnings
    }
}
