//! Chat port - Interface for the conversational model

use async_trait::async_trait;
use domain::ChatMessage;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// One reply from the chat collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Generated text
    pub content: String,
    /// Model that produced the reply
    pub model: String,
    /// Total tokens consumed, when reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Port for chat completions
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatPort: Send + Sync {
    /// Send the messages in order and return the single reply
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatReply, ApplicationError>;

    /// Check if the collaborator is reachable
    async fn is_healthy(&self) -> bool;

    /// Name of the model requests are sent to
    fn current_model(&self) -> String;
}
