//! In-memory personalization cache.
//!
//! Entries expire `ttl` after they were written and the cache holds at most
//! `max_size` entries. When full, inserting a new key evicts the entry that
//! was inserted first (FIFO); reads do not affect eviction order, and
//! overwriting a key keeps its original position.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;

use crate::domain::cycle::Phase;
use crate::domain::foundation::Timestamp;
use crate::ports::{CacheError, CacheKey, CacheStats, Clock, PersonalizationCache};

/// Default entry lifetime (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// Default maximum number of entries.
pub const DEFAULT_MAX_SIZE: usize = 100;

#[derive(Debug, Clone)]
struct CacheEntry {
    artifact: Value,
    created_at: Timestamp,
    ttl_ms: i64,
}

impl CacheEntry {
    fn is_expired(&self, now: Timestamp) -> bool {
        now.millis_since(&self.created_at) > self.ttl_ms
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Keys in first-insertion order.
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

impl CacheState {
    fn remove(&mut self, key: &CacheKey) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }
}

/// Thread-safe in-memory implementation of [`PersonalizationCache`].
pub struct InMemoryPersonalizationCache {
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
    max_size: usize,
    state: Mutex<CacheState>,
}

impl InMemoryPersonalizationCache {
    /// Creates a cache with the given lifetime and capacity.
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration, max_size: usize) -> Result<Self, CacheError> {
        if max_size == 0 {
            return Err(CacheError::ZeroCapacity);
        }
        Ok(Self {
            clock,
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            max_size,
            state: Mutex::new(CacheState::default()),
        })
    }

    /// Creates a cache with a 5 minute TTL and room for 100 entries.
    pub fn with_defaults(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            ttl_ms: DEFAULT_TTL.as_millis() as i64,
            max_size: DEFAULT_MAX_SIZE,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms as u64)
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for InMemoryPersonalizationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryPersonalizationCache")
            .field("ttl_ms", &self.ttl_ms)
            .field("max_size", &self.max_size)
            .finish_non_exhaustive()
    }
}

impl PersonalizationCache for InMemoryPersonalizationCache {
    fn get(&self, persona: &str, phase: Phase, context: &Value) -> Option<Value> {
        let key = CacheKey::new(persona, phase, context);
        let now = self.clock.now();
        let mut state = self.lock();

        match state.entries.get(&key).map(|entry| entry.is_expired(now)) {
            None => {
                state.misses += 1;
                return None;
            }
            Some(true) => {
                state.remove(&key);
                state.expirations += 1;
                state.misses += 1;
                tracing::debug!(key = %key, "Cache entry expired");
                return None;
            }
            Some(false) => {}
        }

        state.hits += 1;
        state.entries.get(&key).map(|entry| entry.artifact.clone())
    }

    fn set(
        &self,
        persona: &str,
        phase: Phase,
        context: &Value,
        artifact: Value,
    ) -> Result<(), CacheError> {
        let key = CacheKey::new(persona, phase, context);
        let entry = CacheEntry {
            artifact,
            created_at: self.clock.now(),
            ttl_ms: self.ttl_ms,
        };
        let mut state = self.lock();

        if let Some(existing) = state.entries.get_mut(&key) {
            *existing = entry;
            return Ok(());
        }

        while state.entries.len() >= self.max_size {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
            state.evictions += 1;
            tracing::debug!(key = %oldest, "Cache entry evicted");
        }

        state.order.push_back(key.clone());
        state.entries.insert(key, entry);
        Ok(())
    }

    fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.lock();

        let expired: Vec<CacheKey> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.remove(key);
        }
        state.expirations += expired.len() as u64;
        expired.len()
    }

    fn invalidate_persona(&self, persona: &str) -> usize {
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|key, _| key.persona != persona);
        state.order.retain(|key| key.persona != persona);
        before - state.entries.len()
    }

    fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }

    fn len(&self) -> usize {
        self.lock().entries.len()
    }

    fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            expirations: state.expirations,
            size: state.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use serde_json::json;

    fn setup(max_size: usize) -> (Arc<ManualClock>, InMemoryPersonalizationCache) {
        let clock = Arc::new(ManualClock::at_millis(1_700_000_000_000));
        let cache =
            InMemoryPersonalizationCache::new(clock.clone(), Duration::from_secs(300), max_size)
                .unwrap();
        (clock, cache)
    }

    fn ctx(i: usize) -> Value {
        json!({ "request": i })
    }

    // ─── Basic Functionality Tests ───────────────────────────────────

    #[test]
    fn set_then_get_returns_artifact() {
        let (_, cache) = setup(10);
        let artifact = json!({"tone": "gentle", "tips": ["rest", "hydrate"]});

        cache.set("coach", Phase::Luteal, &ctx(1), artifact.clone()).unwrap();
        assert_eq!(cache.get("coach", Phase::Luteal, &ctx(1)), Some(artifact));
    }

    #[test]
    fn key_includes_persona_phase_and_context() {
        let (_, cache) = setup(10);
        cache.set("coach", Phase::Luteal, &ctx(1), json!(1)).unwrap();

        assert!(cache.get("friend", Phase::Luteal, &ctx(1)).is_none());
        assert!(cache.get("coach", Phase::Menstrual, &ctx(1)).is_none());
        assert!(cache.get("coach", Phase::Luteal, &ctx(2)).is_none());
    }

    #[test]
    fn logically_equal_contexts_share_entry() {
        let (_, cache) = setup(10);
        let a: Value = serde_json::from_str(r#"{"x": 1, "y": 2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"y": 2, "x": 1}"#).unwrap();

        cache.set("coach", Phase::Follicular, &a, json!("hello")).unwrap();
        assert_eq!(cache.get("coach", Phase::Follicular, &b), Some(json!("hello")));
    }

    #[test]
    fn overwrite_replaces_value() {
        let (_, cache) = setup(10);
        cache.set("coach", Phase::Luteal, &ctx(1), json!(1)).unwrap();
        cache.set("coach", Phase::Luteal, &ctx(1), json!(2)).unwrap();

        assert_eq!(cache.get("coach", Phase::Luteal, &ctx(1)), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    // ─── Expiry Tests ────────────────────────────────────────────────

    #[test]
    fn entry_is_live_until_ttl_elapses() {
        let (clock, cache) = setup(10);
        cache.set("coach", Phase::Luteal, &ctx(1), json!(1)).unwrap();

        clock.advance(Duration::from_secs(300));
        assert!(cache.get("coach", Phase::Luteal, &ctx(1)).is_some());

        clock.advance(Duration::from_millis(1));
        assert!(cache.get("coach", Phase::Luteal, &ctx(1)).is_none());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn purge_expired_removes_only_stale_entries() {
        let (clock, cache) = setup(10);
        cache.set("coach", Phase::Luteal, &ctx(1), json!(1)).unwrap();
        clock.advance(Duration::from_secs(200));
        cache.set("coach", Phase::Luteal, &ctx(2), json!(2)).unwrap();
        clock.advance(Duration::from_secs(150));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("coach", Phase::Luteal, &ctx(2)).is_some());
    }

    // ─── Eviction Tests ──────────────────────────────────────────────

    #[test]
    fn inserting_past_capacity_evicts_first_inserted() {
        let (_, cache) = setup(DEFAULT_MAX_SIZE);
        for i in 0..=DEFAULT_MAX_SIZE {
            cache.set("coach", Phase::Luteal, &ctx(i), json!(i)).unwrap();
        }

        assert_eq!(cache.len(), DEFAULT_MAX_SIZE);
        assert!(cache.get("coach", Phase::Luteal, &ctx(0)).is_none());
        for i in 1..=DEFAULT_MAX_SIZE {
            assert_eq!(cache.get("coach", Phase::Luteal, &ctx(i)), Some(json!(i)));
        }
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn reads_do_not_protect_from_eviction() {
        let (_, cache) = setup(2);
        cache.set("coach", Phase::Luteal, &ctx(1), json!(1)).unwrap();
        cache.set("coach", Phase::Luteal, &ctx(2), json!(2)).unwrap();
        assert!(cache.get("coach", Phase::Luteal, &ctx(1)).is_some());

        cache.set("coach", Phase::Luteal, &ctx(3), json!(3)).unwrap();
        assert!(cache.get("coach", Phase::Luteal, &ctx(1)).is_none());
        assert!(cache.get("coach", Phase::Luteal, &ctx(2)).is_some());
    }

    #[test]
    fn overwrite_keeps_original_position() {
        let (_, cache) = setup(2);
        cache.set("coach", Phase::Luteal, &ctx(1), json!(1)).unwrap();
        cache.set("coach", Phase::Luteal, &ctx(2), json!(2)).unwrap();
        cache.set("coach", Phase::Luteal, &ctx(1), json!(10)).unwrap();

        cache.set("coach", Phase::Luteal, &ctx(3), json!(3)).unwrap();
        assert!(cache.get("coach", Phase::Luteal, &ctx(1)).is_none());
        assert!(cache.get("coach", Phase::Luteal, &ctx(2)).is_some());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let clock = Arc::new(ManualClock::at_millis(0));
        let result = InMemoryPersonalizationCache::new(clock, DEFAULT_TTL, 0);
        assert_eq!(result.unwrap_err(), CacheError::ZeroCapacity);
    }

    // ─── Maintenance Tests ───────────────────────────────────────────

    #[test]
    fn invalidate_persona_removes_only_that_persona() {
        let (_, cache) = setup(10);
        cache.set("coach", Phase::Luteal, &ctx(1), json!(1)).unwrap();
        cache.set("coach", Phase::Menstrual, &ctx(1), json!(2)).unwrap();
        cache.set("friend", Phase::Luteal, &ctx(1), json!(3)).unwrap();

        assert_eq!(cache.invalidate_persona("coach"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("friend", Phase::Luteal, &ctx(1)).is_some());
    }

    #[test]
    fn stats_track_hits_and_misses() {
        let (_, cache) = setup(10);
        cache.set("coach", Phase::Luteal, &ctx(1), json!(1)).unwrap();
        cache.get("coach", Phase::Luteal, &ctx(1));
        cache.get("coach", Phase::Luteal, &ctx(9));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn clear_empties_cache() {
        let (_, cache) = setup(10);
        cache.set("coach", Phase::Luteal, &ctx(1), json!(1)).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
