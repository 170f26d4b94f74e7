//! Integration tests for the personalization pipeline.
//!
//! These tests drive the public API end to end:
//! 1. PipelineInitializer wires cache, harness and monitor from a config
//! 2. PersonalizationPipeline serves artifacts through the cache
//! 3. PipelineMonitor aggregates executions and deduplicates alerts
//!
//! Time is controlled with ManualClock; collaborators are in-memory.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cycle_insight::adapters::{
    FixedMemoryProbe, InMemoryAlertSink, InMemoryObservationLog, ManualClock,
    StaticProfileProvider,
};
use cycle_insight::application::{Collaborators, PipelineInitializer};
use cycle_insight::config::PipelineConfig;
use cycle_insight::domain::cycle::{CycleProfile, Phase};
use cycle_insight::domain::experiment::{EstimationMode, ExperimentOutcome, SkipReason};
use cycle_insight::domain::foundation::Timestamp;
use cycle_insight::domain::monitoring::{AlertKind, HealthStatus};
use cycle_insight::domain::observation::Observation;
use cycle_insight::ports::{Clock, CollaboratorError, PersonalizationProducer};

// =============================================================================
// Test Infrastructure
// =============================================================================

// 2024-06-15T12:00:00Z
const NOW_MS: i64 = 1_718_452_800_000;

/// Producer that echoes its inputs and counts calls
struct EchoProducer {
    calls: AtomicUsize,
}

impl PersonalizationProducer for EchoProducer {
    fn produce(
        &self,
        persona: &str,
        phase: Phase,
        context: &Value,
    ) -> Result<Value, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "persona": persona, "phase": phase, "context": context }))
    }
}

struct Harness {
    initializer: PipelineInitializer,
    clock: Arc<ManualClock>,
    log: Arc<InMemoryObservationLog>,
    alerts: Arc<InMemoryAlertSink>,
    producer: Arc<EchoProducer>,
}

fn harness(days_since_period: i64) -> Harness {
    let clock = Arc::new(ManualClock::at_millis(NOW_MS));
    let start = Timestamp::from_unix_millis(NOW_MS)
        .unwrap()
        .minus_days(days_since_period);
    let log = Arc::new(InMemoryObservationLog::new());
    let alerts = Arc::new(InMemoryAlertSink::new());
    let producer = Arc::new(EchoProducer {
        calls: AtomicUsize::new(0),
    });

    let initializer = PipelineInitializer::new(Collaborators {
        profiles: Arc::new(StaticProfileProvider::new(
            CycleProfile::default().with_last_period(start),
        )),
        observations: log.clone(),
        producer: producer.clone(),
        alerts: alerts.clone(),
        memory: Arc::new(FixedMemoryProbe::new(None)),
        clock: clock.clone(),
    });

    Harness {
        initializer,
        clock,
        log,
        alerts,
        producer,
    }
}

fn quiet_config() -> PipelineConfig {
    PipelineConfig {
        enable_monitoring: false,
        ..PipelineConfig::default()
    }
}

// =============================================================================
// Cache flow
// =============================================================================

#[tokio::test]
async fn repeated_requests_hit_the_cache_until_ttl_expires() {
    let h = harness(10);
    assert!(h.initializer.initialize(&quiet_config()).await.success());
    let pipeline = h.initializer.pipeline().unwrap();
    let context = json!({ "screen": "journal", "locale": "fr" });

    let first = pipeline.personalize("mentor", &context).unwrap();
    assert_eq!(first.estimate.phase, Phase::Follicular);
    assert!(!first.cache_hit);

    // Same logical context, different key order
    let reordered = json!({ "locale": "fr", "screen": "journal" });
    let second = pipeline.personalize("mentor", &reordered).unwrap();
    assert!(second.cache_hit);
    assert_eq!(second.artifact, first.artifact);

    h.clock.advance(Duration::from_millis(300_001));
    let third = pipeline.personalize("mentor", &context).unwrap();
    assert!(!third.cache_hit);
    assert_eq!(h.producer.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn small_cache_evicts_first_inserted_persona() {
    let h = harness(10);
    let mut config = quiet_config();
    config.cache.max_size = 2;
    h.initializer.initialize(&config).await;
    let pipeline = h.initializer.pipeline().unwrap();
    let context = json!({});

    pipeline.personalize("a", &context).unwrap();
    pipeline.personalize("b", &context).unwrap();
    pipeline.personalize("c", &context).unwrap();

    assert!(!pipeline.personalize("a", &context).unwrap().cache_hit);
    assert_eq!(pipeline.cache().unwrap().stats().evictions, 2);
}

// =============================================================================
// Experiments
// =============================================================================

#[tokio::test]
async fn experiment_waits_for_seven_observations() {
    let h = harness(20);
    h.initializer.initialize(&quiet_config()).await;
    let pipeline = h.initializer.pipeline().unwrap();
    let now = h.clock.now();

    for _ in 0..6 {
        h.log.record(Observation::new(Some(Phase::Luteal), 2.0, 2.0, now));
    }
    match pipeline.run_experiment().unwrap() {
        ExperimentOutcome::Skipped {
            reason,
            fallback_phase,
        } => {
            assert_eq!(reason, SkipReason::InsufficientObservations);
            assert_eq!(fallback_phase, Phase::Luteal);
        }
        other => panic!("expected skip, got {other:?}"),
    }

    h.log.record(Observation::new(Some(Phase::Luteal), 2.0, 2.0, now));
    let outcome = pipeline.run_experiment().unwrap();
    let report = outcome.report().expect("experiment should run");
    assert_eq!(report.metadata.observations_count, 7);
    assert_eq!(report.observation.phase, Phase::Luteal);
    // Labels agree with the calendar, so the observation strategy scores
    // full accuracy plus its bonus.
    assert_eq!(report.winner_mode, EstimationMode::Observation);
    assert_eq!(report.winner_phase, Phase::Luteal);
}

// =============================================================================
// Monitoring
// =============================================================================

#[tokio::test]
async fn monitor_tracks_requests_and_deduplicates_alerts() {
    let h = harness(10);
    h.initializer.initialize(&quiet_config()).await;
    let monitor = h.initializer.monitor().clone();

    monitor.record_execution(500.0, Some(false), None);
    monitor.record_execution(600.0, Some(false), None);
    let slow_alerts = h
        .alerts
        .alerts()
        .into_iter()
        .filter(|alert| alert.kind == AlertKind::SlowExecution)
        .count();
    assert_eq!(slow_alerts, 1);
    assert_eq!(monitor.suppressed_alerts(), 1);

    h.clock.advance(Duration::from_secs(61));
    monitor.record_execution(700.0, Some(false), None);
    assert_eq!(h.alerts.len(), 2);

    assert_eq!(monitor.health(), HealthStatus::Warning);
    assert_eq!(monitor.health_score(), 100 - 20 - 15 - 15);
}

#[tokio::test]
async fn sampler_runs_while_monitoring_is_enabled() {
    let h = harness(10);
    let mut config = PipelineConfig::default();
    config.sampler.interval_ms = 10;

    let outcome = h.initializer.initialize(&config).await;
    assert!(outcome.success());
    assert!(h.initializer.sampler_running());

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(h.initializer.shutdown().await);
    assert!(!h.initializer.sampler_running());
}

// =============================================================================
// Degraded startup
// =============================================================================

#[tokio::test]
async fn invalid_thresholds_still_leave_a_working_pipeline() {
    let h = harness(10);
    let mut config = PipelineConfig::default();
    config.performance_thresholds.error_rate = 2.0;

    let outcome = h.initializer.initialize(&config).await;
    assert!(outcome.is_fallback());
    assert!(!h.initializer.sampler_running());

    let pipeline = h.initializer.pipeline().unwrap();
    let served = pipeline.personalize("mentor", &json!({})).unwrap();
    assert_eq!(served.estimate.phase, Phase::Follicular);
    assert!(!served.cache_hit);

    assert!(h
        .alerts
        .alerts()
        .iter()
        .any(|alert| alert.kind == AlertKind::InitializationFailure));
}
