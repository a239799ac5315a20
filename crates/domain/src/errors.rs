//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// A selector label that is not part of the registry
    #[error("Unknown {axis}: {value}")]
    UnknownOption { axis: String, value: String },

    /// A prompt placeholder was given an empty value
    #[error("Prompt variable '{0}' must not be empty")]
    EmptyPromptVariable(String),

    /// User message is empty or whitespace only
    #[error("Message cannot be empty")]
    EmptyMessage,

    /// The instruction template could not be rendered
    #[error("Prompt template error: {0}")]
    PromptTemplate(String),
}

impl DomainError {
    /// Create an unknown option error
    pub fn unknown_option(axis: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownOption {
            axis: axis.into(),
            value: value.into(),
        }
    }
}
