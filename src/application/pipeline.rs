//! PersonalizationPipeline - Phase estimate, cached artifact lookup and
//! metrics recording for one request.
//!
//! Flow of `personalize`:
//! 1. Estimate the current phase (observations if sufficient, calendar otherwise)
//! 2. Look the artifact up in the cache
//! 3. On a miss, ask the producer and store the result
//! 4. Record the execution with the monitor
//!
//! The cache and the monitor are side channels: their failures are logged
//! and never stop a phase from being returned. Without a cache, executions
//! are recorded with no hit or miss so the hit rate stays undefined.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::cycle::{CycleProfile, Phase, PhaseCalculator};
use crate::domain::experiment::{ExperimentHarness, ExperimentOutcome};
use crate::domain::monitoring::HealthReport;
use crate::domain::observation::{
    Observation, ObservationEstimator, PhaseEstimate, DEFAULT_HISTORY_CAPACITY,
};
use crate::ports::{
    Clock, CollaboratorError, ObservationLog, PersonalizationCache, PersonalizationProducer,
    ProfileProvider,
};

use super::monitor::PipelineMonitor;

/// Errors surfaced by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Personalization producer failed: {0}")]
    Producer(#[from] CollaboratorError),
}

/// Artifact returned for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personalization {
    pub persona: String,
    pub estimate: PhaseEstimate,
    pub artifact: Value,
    pub cache_hit: bool,
}

/// Per-request orchestration over the estimator, cache and monitor.
pub struct PersonalizationPipeline {
    profiles: Arc<dyn ProfileProvider>,
    observations: Arc<dyn ObservationLog>,
    producer: Arc<dyn PersonalizationProducer>,
    monitor: Arc<PipelineMonitor>,
    clock: Arc<dyn Clock>,
    cache: Option<Arc<dyn PersonalizationCache>>,
    harness: Option<Arc<ExperimentHarness>>,
    estimator: ObservationEstimator,
    history_limit: usize,
}

impl PersonalizationPipeline {
    pub fn new(
        profiles: Arc<dyn ProfileProvider>,
        observations: Arc<dyn ObservationLog>,
        producer: Arc<dyn PersonalizationProducer>,
        monitor: Arc<PipelineMonitor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            profiles,
            observations,
            producer,
            monitor,
            clock,
            cache: None,
            harness: None,
            estimator: ObservationEstimator::default(),
            history_limit: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Enables caching of produced artifacts.
    pub fn with_cache(mut self, cache: Arc<dyn PersonalizationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Enables experiments. The estimator adopts the harness's minimum
    /// observation count.
    pub fn with_harness(mut self, harness: Arc<ExperimentHarness>) -> Self {
        self.estimator = ObservationEstimator::new(harness.settings().min_observations);
        self.harness = Some(harness);
        self
    }

    /// How many recent observations are read per request.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn cache(&self) -> Option<&Arc<dyn PersonalizationCache>> {
        self.cache.as_ref()
    }

    pub fn monitor(&self) -> &Arc<PipelineMonitor> {
        &self.monitor
    }

    fn calculator(&self) -> PhaseCalculator {
        PhaseCalculator::at(self.clock.now())
    }

    fn profile(&self) -> CycleProfile {
        self.profiles.current_profile().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Profile unavailable, using defaults");
            CycleProfile::default()
        })
    }

    fn recent_observations(&self) -> Vec<Observation> {
        self.observations
            .recent_observations(self.history_limit)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Observation log unavailable, using calendar only");
                Vec::new()
            })
    }

    /// Best available estimate of the current phase.
    pub fn current_phase(&self) -> PhaseEstimate {
        self.estimator.estimate(
            &self.calculator(),
            &self.profile(),
            &self.recent_observations(),
        )
    }

    /// Returns the artifact for `persona` in the current phase.
    pub fn personalize(
        &self,
        persona: &str,
        context: &Value,
    ) -> Result<Personalization, PipelineError> {
        let started = Instant::now();
        let estimate = self.current_phase();
        let miss = self.cache.as_ref().map(|_| false);

        if let Some(artifact) = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get(persona, estimate.phase, context))
        {
            self.monitor.record_execution(elapsed_ms(started), Some(true), None);
            return Ok(Personalization {
                persona: persona.to_string(),
                estimate,
                artifact,
                cache_hit: true,
            });
        }

        let artifact = match self.producer.produce(persona, estimate.phase, context) {
            Ok(artifact) => artifact,
            Err(e) => {
                let message = e.to_string();
                self.monitor
                    .record_execution(elapsed_ms(started), miss, Some(&message));
                return Err(e.into());
            }
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(persona, estimate.phase, context, artifact.clone()) {
                tracing::warn!(error = %e, persona, "Failed to cache personalization");
            }
        }

        self.monitor.record_execution(elapsed_ms(started), miss, None);
        Ok(Personalization {
            persona: persona.to_string(),
            estimate,
            artifact,
            cache_hit: false,
        })
    }

    /// Runs an experiment on current data; `None` when experiments are off.
    pub fn run_experiment(&self) -> Option<ExperimentOutcome> {
        let harness = self.harness.as_ref()?;
        Some(harness.run(
            &self.calculator(),
            &self.profile(),
            &self.recent_observations(),
        ))
    }

    /// Pre-computes artifacts for every persona in every phase.
    ///
    /// Producer failures skip that combination. Returns how many artifacts
    /// were stored.
    pub fn warm_cache(&self, personas: &[String], context: &Value) -> usize {
        let Some(cache) = &self.cache else {
            return 0;
        };

        let mut stored = 0;
        for persona in personas {
            for phase in Phase::ALL {
                let artifact = match self.producer.produce(persona, phase, context) {
                    Ok(artifact) => artifact,
                    Err(e) => {
                        tracing::warn!(error = %e, persona = %persona, phase = %phase, "Warm-up skipped");
                        continue;
                    }
                };
                match cache.set(persona, phase, context, artifact) {
                    Ok(()) => stored += 1,
                    Err(e) => tracing::warn!(error = %e, "Warm-up store failed"),
                }
            }
        }
        tracing::debug!(stored, "Cache warmed");
        stored
    }

    /// Drops expired cache entries and old execution history.
    pub fn refresh(&self) -> (usize, usize) {
        let expired = self
            .cache
            .as_ref()
            .map_or(0, |cache| cache.purge_expired());
        let pruned = self.monitor.cleanup();
        (expired, pruned)
    }

    pub fn health_report(&self) -> HealthReport {
        self.monitor.health_report()
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
