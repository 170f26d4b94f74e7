//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to the outside world:
//! - `cache` - In-memory personalization cache (TTL + FIFO eviction)
//! - `alerts` - Alert sinks (tracing, in-memory)
//! - `clock` - System and manual clocks
//! - `collaborators` - In-memory profile, observation and memory sources

pub mod alerts;
pub mod cache;
pub mod clock;
pub mod collaborators;

pub use alerts::{InMemoryAlertSink, TracingAlertSink};
pub use cache::InMemoryPersonalizationCache;
pub use clock::{ManualClock, SystemClock};
pub use collaborators::{FixedMemoryProbe, InMemoryObservationLog, StaticProfileProvider};
