//! Application layer - Services that wire ports and domain together.
//!
//! - `PipelineMonitor` - shared metrics, health and deduplicated alerts
//! - `HealthSampler` - cancellable background health check
//! - `PersonalizationPipeline` - per-request phase estimate and cached artifact
//! - `PipelineInitializer` - staged startup with a minimal-services fallback

mod initializer;
mod monitor;
mod pipeline;
mod sampler;

pub use initializer::{
    Collaborators, InitializationError, InitializationOutcome, PipelineInitializer,
};
pub use monitor::PipelineMonitor;
pub use pipeline::{Personalization, PersonalizationPipeline, PipelineError};
pub use sampler::{HealthSampler, SamplerHandle};
