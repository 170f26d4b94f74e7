//! PersonalizationProducer port - Builds the artifacts the cache stores.

use serde_json::Value;

use crate::domain::cycle::Phase;

use super::CollaboratorError;

/// Port for producing a personalization artifact.
///
/// The artifact is opaque to the pipeline; it is only cached and returned.
pub trait PersonalizationProducer: Send + Sync {
    /// Produces the artifact for a persona in a phase.
    fn produce(&self, persona: &str, phase: Phase, context: &Value)
        -> Result<Value, CollaboratorError>;
}
