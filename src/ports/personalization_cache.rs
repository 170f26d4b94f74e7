//! PersonalizationCache port - Bounded, TTL'd store for personalization
//! artifacts.
//!
//! Entries are keyed by persona, phase and a stable digest of the request
//! context. Two contexts that serialize to the same JSON (regardless of
//! object key order) share a key.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

use crate::domain::cycle::Phase;

/// Port for the personalization cache.
///
/// Implementations must be safe to share between threads.
pub trait PersonalizationCache: Send + Sync {
    /// Returns the artifact if present and not expired.
    fn get(&self, persona: &str, phase: Phase, context: &Value) -> Option<Value>;

    /// Inserts or overwrites an artifact, evicting if at capacity.
    fn set(
        &self,
        persona: &str,
        phase: Phase,
        context: &Value,
        artifact: Value,
    ) -> Result<(), CacheError>;

    /// Removes expired entries; returns how many were removed.
    fn purge_expired(&self) -> usize;

    /// Removes every entry for a persona; returns how many were removed.
    fn invalidate_persona(&self, persona: &str) -> usize;

    /// Removes every entry.
    fn clear(&self);

    /// Number of stored entries, expired or not.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counters since creation.
    fn stats(&self) -> CacheStats;
}

/// Errors raised by cache operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("Cache capacity must be at least 1")]
    ZeroCapacity,

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Composite cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub persona: String,
    pub phase: Phase,
    pub context_hash: String,
}

impl CacheKey {
    pub fn new(persona: &str, phase: Phase, context: &Value) -> Self {
        Self {
            persona: persona.to_string(),
            phase,
            context_hash: stable_hash(context),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.persona, self.phase, self.context_hash)
    }
}

/// Counters describing cache behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub size: usize,
}

impl CacheStats {
    /// Hits per lookup; `None` before the first lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            None
        } else {
            Some(self.hits as f64 / lookups as f64)
        }
    }
}

/// Serializes a JSON value with object keys sorted at every level.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Hex SHA-256 digest of the canonical serialization of `context`.
pub fn stable_hash(context: &Value) -> String {
    let digest = Sha256::digest(canonical_json(context).as_bytes());
    format!("{:x}", digest)
}
