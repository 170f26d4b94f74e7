//! Personalization cache configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::ValidationError;

/// Cache sizing and warm-up configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in milliseconds
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    /// Maximum number of entries
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Personas pre-computed for every phase at startup
    #[serde(default)]
    pub warm_personas: Vec<String>,
}

fn default_ttl_ms() -> u64 {
    300_000
}

fn default_max_size() -> usize {
    100
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            max_size: default_max_size(),
            warm_personas: Vec::new(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ttl_ms == 0 {
            return Err(ValidationError::ZeroCacheTtl);
        }
        if self.max_size == 0 {
            return Err(ValidationError::ZeroCacheSize);
        }
        Ok(())
    }
}
