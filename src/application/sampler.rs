//! HealthSampler - Periodic background health check.
//!
//! Each tick reads the memory probe, feeds the reading to the monitor and
//! raises a `HealthDegraded` alert while the pipeline is not healthy.
//!
//! ## Shutdown
//!
//! The task listens on a watch channel. `SamplerHandle::stop` signals it and
//! waits for the task to finish; dropping the handle closes the channel,
//! which also ends the task.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::domain::monitoring::{AlertKind, AlertLevel, HealthStatus};
use crate::ports::MemoryProbe;

use super::monitor::PipelineMonitor;

/// Samples memory and health on a fixed interval.
pub struct HealthSampler {
    monitor: Arc<PipelineMonitor>,
    probe: Arc<dyn MemoryProbe>,
    interval: Duration,
}

impl HealthSampler {
    pub fn new(
        monitor: Arc<PipelineMonitor>,
        probe: Arc<dyn MemoryProbe>,
        interval: Duration,
    ) -> Self {
        Self {
            monitor,
            probe,
            interval,
        }
    }

    /// Runs exactly one sample.
    pub fn sample_once(&self) -> HealthStatus {
        if let Some(usage) = self.probe.sample() {
            self.monitor.record_memory_usage(usage);
        }

        let report = self.monitor.health_report();
        if !report.status.is_healthy() {
            let level = match report.status {
                HealthStatus::Critical => AlertLevel::Critical,
                _ => AlertLevel::Warning,
            };
            self.monitor.alert(
                AlertKind::HealthDegraded,
                level,
                format!("Pipeline health is {} (score {})", report.status, report.score),
                json!({
                    "status": report.status,
                    "score": report.score,
                    "recommendations": report.recommendations,
                }),
            );
        }
        report.status
    }

    /// Samples until `shutdown` is set to true or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return;
                    }
                }

                _ = interval.tick() => {
                    self.sample_once();
                }
            }
        }
    }

    /// Spawns the sampling loop on the current tokio runtime.
    pub fn spawn(self) -> SamplerHandle {
        let (shutdown, receiver) = watch::channel(false);
        let interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
        let task = tokio::spawn(async move {
            self.run(receiver).await;
            tracing::info!("Health sampler stopped");
        });
        tracing::info!(interval_ms, "Health sampler started");
        SamplerHandle { shutdown, task }
    }
}

/// Owner of a running sampler task.
#[derive(Debug)]
pub struct SamplerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SamplerHandle {
    /// Signals the task and waits for it to exit.
    pub async fn stop(self) {
        // The receiver is gone if the task already exited.
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Health sampler task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedMemoryProbe, InMemoryAlertSink, ManualClock};
    use crate::domain::monitoring::PerformanceThresholds;

    fn setup(
        reading: Option<f64>,
    ) -> (Arc<PipelineMonitor>, Arc<InMemoryAlertSink>, Arc<FixedMemoryProbe>) {
        let sink = Arc::new(InMemoryAlertSink::new());
        let clock = Arc::new(ManualClock::at_millis(1_700_000_000_000));
        let monitor = Arc::new(PipelineMonitor::new(
            PerformanceThresholds::default(),
            sink.clone(),
            clock,
        ));
        (monitor, sink, Arc::new(FixedMemoryProbe::new(reading)))
    }

    #[test]
    fn sample_once_on_healthy_pipeline_raises_nothing() {
        let (monitor, sink, probe) = setup(Some(10.0));
        let sampler = HealthSampler::new(monitor.clone(), probe, Duration::from_secs(30));

        assert_eq!(sampler.sample_once(), HealthStatus::Healthy);
        assert!(sink.is_empty());
        assert_eq!(monitor.snapshot().memory_usage, Some(10.0));
    }

    #[test]
    fn sample_once_on_degraded_pipeline_alerts() {
        let (monitor, sink, probe) = setup(None);
        monitor.record_execution(5.0, Some(true), Some("boom"));
        sink.clear();

        let sampler = HealthSampler::new(monitor, probe, Duration::from_secs(30));
        assert_eq!(sampler.sample_once(), HealthStatus::Critical);

        let alerts = sink.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::HealthDegraded);
        assert_eq!(alerts[0].level, AlertLevel::Critical);
    }

    #[tokio::test]
    async fn spawned_sampler_samples_until_stopped() {
        let (monitor, sink, probe) = setup(Some(90.0));
        let sampler = HealthSampler::new(monitor.clone(), probe, Duration::from_millis(10));

        let handle = sampler.spawn();
        time::sleep(Duration::from_millis(50)).await;
        handle.stop().await;

        assert_eq!(monitor.snapshot().memory_usage, Some(90.0));
        assert!(sink
            .alerts()
            .iter()
            .any(|alert| alert.kind == AlertKind::MemoryUsage));
    }

    #[tokio::test]
    async fn dropping_the_handle_ends_the_task() {
        let (monitor, _, probe) = setup(None);
        let sampler = HealthSampler::new(monitor, probe, Duration::from_millis(10));

        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(async move { sampler.run(receiver).await });
        drop(shutdown);

        time::timeout(Duration::from_secs(1), task)
            .await
            .expect("sampler should exit once the sender is gone")
            .unwrap();
    }
}
