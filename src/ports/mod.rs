//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Collaborator Ports
//!
//! - `ProfileProvider` - Supplies the cycle profile
//! - `ObservationLog` - Supplies logged observations
//! - `PersonalizationProducer` - Builds the artifacts that get cached
//! - `AlertSink` - Receives deduplicated alerts
//! - `MemoryProbe` - Caller-defined memory readings for the health sampler
//!
//! ## Infrastructure Ports
//!
//! - `PersonalizationCache` - Bounded, TTL'd artifact store
//! - `Clock` - Current time

mod alert_sink;
mod clock;
mod collaborator_error;
mod memory_probe;
mod observation_log;
mod personalization_cache;
mod personalization_producer;
mod profile_provider;

pub use alert_sink::AlertSink;
pub use clock::Clock;
pub use collaborator_error::CollaboratorError;
pub use memory_probe::MemoryProbe;
pub use observation_log::ObservationLog;
pub use personalization_cache::{
    canonical_json, stable_hash, CacheError, CacheKey, CacheStats, PersonalizationCache,
};
pub use personalization_producer::PersonalizationProducer;
pub use profile_provider::ProfileProvider;
