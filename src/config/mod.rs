//! Pipeline configuration module
//!
//! Configuration is loaded from environment variables with the
//! `CYCLE_INSIGHT` prefix, nested values separated by `__`. A file source
//! (TOML, JSON or YAML, chosen by extension) can be layered underneath.
//!
//! # Example
//!
//! ```no_run
//! use cycle_insight::config::PipelineConfig;
//!
//! let config = PipelineConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Cache TTL: {:?}", config.cache.ttl());
//! ```

mod cache;
mod error;
mod sampler;

pub use cache::CacheConfig;
pub use error::{ConfigError, ValidationError};
pub use sampler::SamplerConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::experiment::HarnessSettings;
use crate::domain::monitoring::PerformanceThresholds;

/// Root pipeline configuration
///
/// Every section has a default, so an empty environment yields a working
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_true")]
    pub enable_cache: bool,

    #[serde(default = "default_true")]
    pub enable_ab_testing: bool,

    #[serde(default = "default_true")]
    pub enable_monitoring: bool,

    #[serde(default = "default_true")]
    pub enable_performance_tracking: bool,

    /// Personalization cache (TTL, size, warm-up personas)
    #[serde(default)]
    pub cache: CacheConfig,

    /// Experiment harness tunables
    #[serde(default)]
    pub experiment: HarnessSettings,

    /// Limits used by the monitor's health evaluation
    #[serde(default)]
    pub performance_thresholds: PerformanceThresholds,

    /// Background health sampling
    #[serde(default)]
    pub sampler: SamplerConfig,
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            enable_ab_testing: true,
            enable_monitoring: true,
            enable_performance_tracking: true,
            cache: CacheConfig::default(),
            experiment: HarnessSettings::default(),
            performance_thresholds: PerformanceThresholds::default(),
            sampler: SamplerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `CYCLE_INSIGHT__ENABLE_CACHE=false` -> `enable_cache = false`
    /// - `CYCLE_INSIGHT__CACHE__TTL_MS=60000` -> `cache.ttl_ms = 60000`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its type.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a file, with environment variables taking
    /// precedence over file values.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cache.validate()?;
        self.sampler.validate()?;
        validate_experiment(&self.experiment)?;
        validate_thresholds(&self.performance_thresholds)?;
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::default()
        .prefix("CYCLE_INSIGHT")
        .separator("__")
}

fn validate_experiment(settings: &HarnessSettings) -> Result<(), ValidationError> {
    if settings.min_observations == 0 {
        return Err(ValidationError::ZeroMinObservations);
    }
    if !is_fraction(settings.confidence_threshold) {
        return Err(ValidationError::InvalidConfidenceThreshold);
    }
    Ok(())
}

fn validate_thresholds(thresholds: &PerformanceThresholds) -> Result<(), ValidationError> {
    if !(thresholds.pipeline_execution_ms.is_finite() && thresholds.pipeline_execution_ms > 0.0) {
        return Err(ValidationError::InvalidThreshold("pipeline_execution_ms"));
    }
    if !is_fraction(thresholds.cache_hit_rate) {
        return Err(ValidationError::InvalidThreshold("cache_hit_rate"));
    }
    if !is_fraction(thresholds.error_rate) {
        return Err(ValidationError::InvalidThreshold("error_rate"));
    }
    if !is_fraction(thresholds.slow_query_rate) {
        return Err(ValidationError::InvalidThreshold("slow_query_rate"));
    }
    if !(thresholds.memory_usage.is_finite() && thresholds.memory_usage >= 0.0) {
        return Err(ValidationError::InvalidThreshold("memory_usage"));
    }
    Ok(())
}

fn is_fraction(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}
