//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Chat collaborator error
    #[error("Inference error: {0}")]
    Inference(String),

    /// Speech or other external service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Spoken input could not be turned into text
    #[error("Speech not recognized: {0}")]
    Recognition(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Request does not fit the current state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether the failure came from a collaborator service
    pub const fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::Inference(_) | Self::ExternalService(_) | Self::RateLimited
        )
    }
}
