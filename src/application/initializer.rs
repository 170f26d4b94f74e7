//! PipelineInitializer - Boot sequence for the personalization pipeline.
//!
//! ## Stages
//!
//! | Stage | Enabled by          | Work                                                   |
//! |-------|---------------------|--------------------------------------------------------|
//! | a     | `enable_cache`      | reset metrics, prune history, build and warm the cache |
//! | b     | `enable_ab_testing` | check harness settings, start with zeroed A/B counters |
//! | c     | `enable_monitoring` | apply thresholds, start the health sampler             |
//! | d     | always              | refresh cache and prune monitor history                |
//! | e     | always              | evaluate health                                        |
//!
//! A failing stage never reaches the caller: the initializer falls back to
//! minimal services (default thresholds, no cache, no experiments) and
//! reports a degraded outcome.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::adapters::InMemoryPersonalizationCache;
use crate::config::{PipelineConfig, ValidationError};
use crate::domain::experiment::ExperimentHarness;
use crate::domain::foundation::Timestamp;
use crate::domain::monitoring::{AlertKind, AlertLevel, HealthReport, PerformanceThresholds};
use crate::ports::{
    AlertSink, CacheError, Clock, MemoryProbe, ObservationLog, PersonalizationCache,
    PersonalizationProducer, ProfileProvider,
};

use super::monitor::PipelineMonitor;
use super::pipeline::PersonalizationPipeline;
use super::sampler::{HealthSampler, SamplerHandle};

/// Failure of one initialization stage.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("Cache setup failed: {0}")]
    Cache(#[from] CacheError),
}

/// Result of [`PipelineInitializer::initialize`].
///
/// Serialized with a `status` tag next to an explicit `success` flag.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InitializationOutcome {
    Ready {
        success: bool,
        config: PipelineConfig,
        health: HealthReport,
        timestamp: Timestamp,
    },
    Degraded {
        success: bool,
        error: String,
        fallback: bool,
        timestamp: Timestamp,
    },
}

impl InitializationOutcome {
    pub fn success(&self) -> bool {
        match self {
            InitializationOutcome::Ready { success, .. }
            | InitializationOutcome::Degraded { success, .. } => *success,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, InitializationOutcome::Degraded { fallback: true, .. })
    }

    pub fn health(&self) -> Option<&HealthReport> {
        match self {
            InitializationOutcome::Ready { health, .. } => Some(health),
            InitializationOutcome::Degraded { .. } => None,
        }
    }
}

/// External collaborators the pipeline is wired to.
#[derive(Clone)]
pub struct Collaborators {
    pub profiles: Arc<dyn ProfileProvider>,
    pub observations: Arc<dyn ObservationLog>,
    pub producer: Arc<dyn PersonalizationProducer>,
    pub alerts: Arc<dyn AlertSink>,
    pub memory: Arc<dyn MemoryProbe>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Default)]
struct InitializerState {
    pipeline: Option<Arc<PersonalizationPipeline>>,
    sampler: Option<SamplerHandle>,
}

/// Wires the cache, harness and monitor together at startup.
pub struct PipelineInitializer {
    collaborators: Collaborators,
    monitor: Arc<PipelineMonitor>,
    state: Mutex<InitializerState>,
}

impl PipelineInitializer {
    pub fn new(collaborators: Collaborators) -> Self {
        let monitor = Arc::new(PipelineMonitor::new(
            PerformanceThresholds::default(),
            collaborators.alerts.clone(),
            collaborators.clock.clone(),
        ));
        Self {
            collaborators,
            monitor,
            state: Mutex::new(InitializerState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, InitializerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn monitor(&self) -> &Arc<PipelineMonitor> {
        &self.monitor
    }

    /// Pipeline built by the last initialization, full or minimal.
    pub fn pipeline(&self) -> Option<Arc<PersonalizationPipeline>> {
        self.lock().pipeline.clone()
    }

    pub fn sampler_running(&self) -> bool {
        self.lock()
            .sampler
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Runs every enabled stage. Must be called inside a tokio runtime.
    ///
    /// Re-initializing stops a sampler left over from a previous run.
    pub async fn initialize(&self, config: &PipelineConfig) -> InitializationOutcome {
        self.shutdown().await;

        let timestamp = self.collaborators.clock.now();
        match self.run_stages(config) {
            Ok(health) => {
                tracing::info!(
                    status = %health.status,
                    score = health.score,
                    "Pipeline initialized"
                );
                InitializationOutcome::Ready {
                    success: true,
                    config: config.clone(),
                    health,
                    timestamp,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Pipeline initialization failed");
                self.start_minimal_services();
                self.monitor.alert(
                    AlertKind::InitializationFailure,
                    AlertLevel::Critical,
                    format!("Initialization failed, running minimal services: {e}"),
                    json!({ "error": e.to_string() }),
                );
                InitializationOutcome::Degraded {
                    success: false,
                    error: e.to_string(),
                    fallback: true,
                    timestamp,
                }
            }
        }
    }

    fn run_stages(&self, config: &PipelineConfig) -> Result<HealthReport, InitializationError> {
        config.validate()?;
        self.monitor
            .set_performance_tracking(config.enable_performance_tracking);

        // a. cache
        let cache = if config.enable_cache {
            self.monitor.reset();
            self.monitor.cleanup();
            let cache = InMemoryPersonalizationCache::new(
                self.collaborators.clock.clone(),
                config.cache.ttl(),
                config.cache.max_size,
            )?;
            tracing::info!(
                ttl_ms = config.cache.ttl_ms,
                max_size = config.cache.max_size,
                "Personalization cache ready"
            );
            Some(Arc::new(cache) as Arc<dyn PersonalizationCache>)
        } else {
            None
        };

        // b. experiments
        let harness = if config.enable_ab_testing {
            for warning in config.experiment.warnings() {
                tracing::warn!(%warning, "Experiment settings");
            }
            let harness = ExperimentHarness::new(config.experiment.clone());
            tracing::info!(
                min_observations = config.experiment.min_observations,
                "Experiment harness ready"
            );
            Some(Arc::new(harness))
        } else {
            None
        };

        let mut pipeline = self.base_pipeline();
        if let Some(cache) = cache {
            pipeline = pipeline.with_cache(cache);
        }
        if let Some(harness) = harness {
            pipeline = pipeline.with_harness(harness);
        }
        let pipeline = Arc::new(pipeline);

        if config.enable_cache && !config.cache.warm_personas.is_empty() {
            let stored = pipeline.warm_cache(&config.cache.warm_personas, &warm_context());
            tracing::info!(stored, "Cache warm-up finished");
        }

        // c. monitoring
        let sampler = if config.enable_monitoring {
            self.monitor.apply_thresholds(config.performance_thresholds);
            let sampler = HealthSampler::new(
                self.monitor.clone(),
                self.collaborators.memory.clone(),
                config.sampler.interval(),
            );
            Some(sampler.spawn())
        } else {
            None
        };

        {
            let mut state = self.lock();
            state.pipeline = Some(pipeline.clone());
            state.sampler = sampler;
        }

        // d. housekeeping
        Self::cleanup_intelligence_data(&pipeline);

        // e. health
        Ok(self.validate_health())
    }

    fn base_pipeline(&self) -> PersonalizationPipeline {
        PersonalizationPipeline::new(
            self.collaborators.profiles.clone(),
            self.collaborators.observations.clone(),
            self.collaborators.producer.clone(),
            self.monitor.clone(),
            self.collaborators.clock.clone(),
        )
    }

    fn cleanup_intelligence_data(pipeline: &PersonalizationPipeline) {
        let (expired, pruned) = pipeline.refresh();
        tracing::debug!(expired, pruned, "Intelligence data cleaned up");
    }

    /// Current health of the pipeline.
    pub fn validate_health(&self) -> HealthReport {
        let report = self.monitor.health_report();
        if !report.status.is_healthy() {
            tracing::warn!(
                status = %report.status,
                score = report.score,
                "Pipeline started in degraded health"
            );
        }
        report
    }

    fn start_minimal_services(&self) {
        self.monitor.apply_thresholds(PerformanceThresholds::default());
        self.lock().pipeline = Some(Arc::new(self.base_pipeline()));
        tracing::warn!("Minimal services started: no cache, no experiments");
    }

    /// Stops the health sampler. Safe to call repeatedly.
    pub async fn shutdown(&self) -> bool {
        let handle = self.lock().sampler.take();
        match handle {
            Some(handle) => {
                handle.stop().await;
                true
            }
            None => false,
        }
    }
}

fn warm_context() -> Value {
    json!({})
}
