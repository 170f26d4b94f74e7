//! Personalization cache adapters.

mod in_memory;

pub use in_memory::{InMemoryPersonalizationCache, DEFAULT_MAX_SIZE, DEFAULT_TTL};
