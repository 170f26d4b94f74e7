//! In-memory collaborator adapters.
//!
//! Stand-ins for the profile store, observation log and memory probe used
//! by single-process deployments and tests.

mod memory_probe;
mod observation_log;
mod static_profile;

pub use memory_probe::FixedMemoryProbe;
pub use observation_log::InMemoryObservationLog;
pub use static_profile::StaticProfileProvider;
