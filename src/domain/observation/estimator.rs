//! Observation Estimator - Adaptive phase estimate from logged observations.
//!
//! With too few observations the estimator defers to the calendar
//! calculator. Once enough data exists, the phase labels of the most recent
//! observations decide, and the most recent label wins ties.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::cycle::{CycleProfile, Phase, PhaseCalculator};

use super::observation::Observation;

/// Observations required before the estimate leaves the calendar.
pub const MIN_OBSERVATIONS: usize = 7;

/// Observations examined when measuring consistency.
pub const CONSISTENCY_WINDOW: usize = 5;

/// Observations examined when measuring accuracy.
pub const ACCURACY_WINDOW: usize = 3;

/// Observation count at which confidence stops growing with volume.
pub const FULL_CONFIDENCE_OBSERVATIONS: usize = 10;

/// Which strategy produced a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMode {
    /// Calendar arithmetic only.
    Predictive,
    /// Derived from logged observations.
    Observation,
}

impl EstimationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimationMode::Predictive => "predictive",
            EstimationMode::Observation => "observation",
        }
    }
}

/// A phase together with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseEstimate {
    pub phase: Phase,
    pub mode: EstimationMode,
    /// Confidence in [0, 100].
    pub confidence: f64,
}

/// Estimator for observation-driven phase detection.
#[derive(Debug, Clone, Copy)]
pub struct ObservationEstimator {
    min_observations: usize,
}

impl Default for ObservationEstimator {
    fn default() -> Self {
        Self::new(MIN_OBSERVATIONS)
    }
}

impl ObservationEstimator {
    /// Creates an estimator requiring `min_observations` before adapting.
    pub fn new(min_observations: usize) -> Self {
        Self {
            min_observations: min_observations.max(1),
        }
    }

    pub fn min_observations(&self) -> usize {
        self.min_observations
    }

    /// Fraction of adjacent pairs among the last five observations that
    /// share either mood or energy.
    ///
    /// Fewer than two observations yield 0.
    pub fn consistency(observations: &[Observation]) -> f64 {
        let recent = tail(observations, CONSISTENCY_WINDOW);
        if recent.len() < 2 {
            return 0.0;
        }

        let pairs = recent.len() - 1;
        let consistent = recent
            .windows(2)
            .filter(|pair| pair[0].same_mood(&pair[1]) || pair[0].same_energy(&pair[1]))
            .count();

        consistent as f64 / pairs as f64
    }

    /// Confidence in [0, 100] from consistency and data volume.
    pub fn confidence(observations: &[Observation]) -> f64 {
        let volume = (observations.len() as f64 / FULL_CONFIDENCE_OBSERVATIONS as f64).min(1.0);
        Self::consistency(observations) * volume * 100.0
    }

    /// Agreement in [0, 100] between recent phase labels and a predicted phase.
    ///
    /// The share of the last three observations labelled `predicted` counts
    /// for up to 100 points, plus a volume bonus of up to 20 points.
    pub fn accuracy(observations: &[Observation], predicted: Phase) -> f64 {
        let recent = tail(observations, ACCURACY_WINDOW);
        let matching = if recent.is_empty() {
            0.0
        } else {
            let hits = recent
                .iter()
                .filter(|obs| obs.phase == Some(predicted))
                .count();
            hits as f64 / recent.len() as f64
        };

        let bonus = (observations.len() as f64 / 20.0).min(0.2);
        ((matching + bonus) * 100.0).min(100.0)
    }

    /// Phase best supported by recent observations.
    ///
    /// Falls back to the calendar when data is insufficient or no recent
    /// observation carries a phase label.
    pub fn estimate_phase(
        &self,
        calculator: &PhaseCalculator,
        profile: &CycleProfile,
        observations: &[Observation],
    ) -> Phase {
        self.estimate(calculator, profile, observations).phase
    }

    /// Like [`estimate_phase`](Self::estimate_phase), also reporting the
    /// mode used and the confidence.
    pub fn estimate(
        &self,
        calculator: &PhaseCalculator,
        profile: &CycleProfile,
        observations: &[Observation],
    ) -> PhaseEstimate {
        let confidence = Self::confidence(observations);

        if observations.len() >= self.min_observations {
            if let Some(phase) = self.dominant_phase(observations) {
                return PhaseEstimate {
                    phase,
                    mode: EstimationMode::Observation,
                    confidence,
                };
            }
        }

        PhaseEstimate {
            phase: calculator.phase_for(profile),
            mode: EstimationMode::Predictive,
            confidence,
        }
    }

    /// Most frequent label among the last `min_observations` entries.
    fn dominant_phase(&self, observations: &[Observation]) -> Option<Phase> {
        // phase -> (count, index of latest occurrence)
        let mut tally: HashMap<Phase, (usize, usize)> = HashMap::new();
        for (index, phase) in tail(observations, self.min_observations)
            .iter()
            .enumerate()
            .filter_map(|(i, obs)| obs.phase.map(|p| (i, p)))
        {
            let entry = tally.entry(phase).or_insert((0, index));
            entry.0 += 1;
            entry.1 = index;
        }

        tally
            .into_iter()
            .max_by_key(|(_, (count, latest))| (*count, *latest))
            .map(|(phase, _)| phase)
    }
}

fn tail(observations: &[Observation], n: usize) -> &[Observation] {
    &observations[observations.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn now() -> Timestamp {
        Timestamp::from_unix_millis(1_718_452_800_000).unwrap()
    }

    fn obs(phase: Option<Phase>, mood: f64, energy: f64) -> Observation {
        Observation::new(phase, mood, energy, now())
    }

    fn labelled(phases: &[Phase]) -> Vec<Observation> {
        phases
            .iter()
            .enumerate()
            .map(|(i, p)| obs(Some(*p), 1.0 + i as f64 % 5.0, 1.0 + (i as f64 + 2.0) % 5.0))
            .collect()
    }

    fn profile_on_day(day: i64) -> CycleProfile {
        CycleProfile::new(Some(now().minus_days(day - 1).into()), 28, 5)
    }

    // ─── consistency / confidence ────────────────────────────────────

    #[test]
    fn consistency_needs_two_observations() {
        assert_eq!(ObservationEstimator::consistency(&[]), 0.0);
        assert_eq!(ObservationEstimator::consistency(&[obs(None, 3.0, 3.0)]), 0.0);
    }

    #[test]
    fn consistency_counts_pairs_sharing_mood_or_energy() {
        let observations = vec![
            obs(None, 3.0, 1.0),
            obs(None, 3.0, 2.0), // same mood
            obs(None, 4.0, 2.0), // same energy
            obs(None, 5.0, 5.0), // neither
            obs(None, 1.0, 1.0), // neither
        ];
        assert!((ObservationEstimator::consistency(&observations) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn consistency_only_looks_at_last_five() {
        let mut observations = vec![obs(None, 1.0, 1.0), obs(None, 5.0, 5.0)];
        observations.extend((0..5).map(|_| obs(None, 2.0, 2.0)));
        assert_eq!(ObservationEstimator::consistency(&observations), 1.0);
    }

    #[test]
    fn confidence_scales_with_volume() {
        let five: Vec<_> = (0..5).map(|_| obs(None, 2.0, 2.0)).collect();
        assert!((ObservationEstimator::confidence(&five) - 50.0).abs() < 1e-9);

        let twelve: Vec<_> = (0..12).map(|_| obs(None, 2.0, 2.0)).collect();
        assert!((ObservationEstimator::confidence(&twelve) - 100.0).abs() < 1e-9);
    }

    // ─── accuracy ────────────────────────────────────────────────────

    #[test]
    fn accuracy_combines_match_share_and_volume_bonus() {
        let observations = labelled(&[
            Phase::Luteal,
            Phase::Luteal,
            Phase::Follicular,
            Phase::Luteal,
        ]);
        // last three: Luteal, Follicular, Luteal -> 2/3; bonus 4/20 = 0.2
        let accuracy = ObservationEstimator::accuracy(&observations, Phase::Luteal);
        assert!((accuracy - (200.0 / 3.0 + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn accuracy_is_capped_at_one_hundred() {
        let observations = labelled(&[Phase::Menstrual; 10]);
        assert_eq!(
            ObservationEstimator::accuracy(&observations, Phase::Menstrual),
            100.0
        );
    }

    #[test]
    fn accuracy_of_empty_log_is_zero() {
        assert_eq!(ObservationEstimator::accuracy(&[], Phase::Luteal), 0.0);
    }

    #[test]
    fn unlabelled_observations_never_match() {
        let observations: Vec<_> = (0..2).map(|_| obs(None, 2.0, 2.0)).collect();
        let accuracy = ObservationEstimator::accuracy(&observations, Phase::Luteal);
        assert!((accuracy - 10.0).abs() < 1e-9);
    }

    // ─── estimate_phase ──────────────────────────────────────────────

    #[test]
    fn few_observations_defer_to_calendar() {
        let estimator = ObservationEstimator::default();
        let calculator = PhaseCalculator::at(now());
        let observations = labelled(&[Phase::Luteal; 6]);

        let estimate = estimator.estimate(&calculator, &profile_on_day(11), &observations);
        assert_eq!(estimate.phase, Phase::Follicular);
        assert_eq!(estimate.mode, EstimationMode::Predictive);
    }

    #[test]
    fn enough_observations_use_majority_label() {
        let estimator = ObservationEstimator::default();
        let calculator = PhaseCalculator::at(now());
        let observations = labelled(&[
            Phase::Luteal,
            Phase::Luteal,
            Phase::Luteal,
            Phase::Follicular,
            Phase::Luteal,
            Phase::Ovulatory,
            Phase::Luteal,
        ]);

        let estimate = estimator.estimate(&calculator, &profile_on_day(11), &observations);
        assert_eq!(estimate.phase, Phase::Luteal);
        assert_eq!(estimate.mode, EstimationMode::Observation);
    }

    #[test]
    fn ties_go_to_most_recent_label() {
        let estimator = ObservationEstimator::default();
        let calculator = PhaseCalculator::at(now());
        let observations = labelled(&[
            Phase::Ovulatory,
            Phase::Luteal,
            Phase::Ovulatory,
            Phase::Luteal,
            Phase::Ovulatory,
            Phase::Luteal,
            Phase::Menstrual,
        ]);
        // Ovulatory 3, Luteal 3: Luteal appears later
        assert_eq!(
            estimator.estimate_phase(&calculator, &profile_on_day(11), &observations),
            Phase::Luteal
        );
    }

    #[test]
    fn only_recent_window_is_counted() {
        let estimator = ObservationEstimator::default();
        let calculator = PhaseCalculator::at(now());
        let mut phases = vec![Phase::Menstrual; 5];
        phases.extend([Phase::Luteal; 7]);
        let observations = labelled(&phases);

        assert_eq!(
            estimator.estimate_phase(&calculator, &profile_on_day(11), &observations),
            Phase::Luteal
        );
    }

    #[test]
    fn unlabelled_log_falls_back_to_calendar() {
        let estimator = ObservationEstimator::default();
        let calculator = PhaseCalculator::at(now());
        let observations: Vec<_> = (0..8).map(|_| obs(None, 3.0, 3.0)).collect();

        let estimate = estimator.estimate(&calculator, &profile_on_day(21), &observations);
        assert_eq!(estimate.phase, Phase::Luteal);
        assert_eq!(estimate.mode, EstimationMode::Predictive);
        assert!((estimate.confidence - 80.0).abs() < 1e-9);
    }
}
