//! Error type shared by external collaborator ports.

use thiserror::Error;

/// Failure reported by a profile provider, observation log or
/// personalization producer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Collaborator returned invalid data: {0}")]
    InvalidData(String),
}

impl CollaboratorError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        CollaboratorError::Unavailable(reason.into())
    }

    pub fn invalid_data(reason: impl Into<String>) -> Self {
        CollaboratorError::InvalidData(reason.into())
    }
}
