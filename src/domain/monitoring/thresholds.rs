//! Performance thresholds the monitor compares live metrics against.

use serde::{Deserialize, Serialize};

/// Limits above (or, for the cache hit rate, below) which the pipeline is
/// considered degraded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceThresholds {
    /// Executions slower than this are slow; also the average-duration limit.
    #[serde(default = "default_pipeline_execution_ms")]
    pub pipeline_execution_ms: f64,

    /// Minimum acceptable cache hit rate.
    #[serde(default = "default_cache_hit_rate")]
    pub cache_hit_rate: f64,

    /// Maximum acceptable error rate.
    #[serde(default = "default_error_rate")]
    pub error_rate: f64,

    /// Maximum acceptable share of slow executions.
    #[serde(default = "default_slow_query_rate")]
    pub slow_query_rate: f64,

    /// Maximum memory usage, in caller-defined units.
    #[serde(default = "default_memory_usage")]
    pub memory_usage: f64,
}

fn default_pipeline_execution_ms() -> f64 {
    50.0
}

fn default_cache_hit_rate() -> f64 {
    0.8
}

fn default_error_rate() -> f64 {
    0.05
}

fn default_slow_query_rate() -> f64 {
    0.1
}

fn default_memory_usage() -> f64 {
    50.0
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            pipeline_execution_ms: default_pipeline_execution_ms(),
            cache_hit_rate: default_cache_hit_rate(),
            error_rate: default_error_rate(),
            slow_query_rate: default_slow_query_rate(),
            memory_usage: default_memory_usage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let t = PerformanceThresholds::default();
        assert_eq!(t.pipeline_execution_ms, 50.0);
        assert_eq!(t.cache_hit_rate, 0.8);
        assert_eq!(t.error_rate, 0.05);
        assert_eq!(t.slow_query_rate, 0.1);
        assert_eq!(t.memory_usage, 50.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let t: PerformanceThresholds =
            serde_json::from_str(r#"{"pipeline_execution_ms": 20}"#).unwrap();
        assert_eq!(t.pipeline_execution_ms, 20.0);
        assert_eq!(t.error_rate, 0.05);
    }
}
