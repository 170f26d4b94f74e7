//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Cache TTL must be greater than zero")]
    ZeroCacheTtl,

    #[error("Cache size must be at least 1")]
    ZeroCacheSize,

    #[error("Experiment minimum observations must be at least 1")]
    ZeroMinObservations,

    #[error("Confidence threshold must be between 0 and 1")]
    InvalidConfidenceThreshold,

    #[error("Invalid performance threshold: {0}")]
    InvalidThreshold(&'static str),

    #[error("Sampler interval must be greater than zero")]
    ZeroSamplerInterval,
}
