//! OpenAI chat adapter - Implements ChatPort using ai_core

use std::{sync::Arc, time::Instant};

use ai_core::{
    InferenceConfig, InferenceEngine, InferenceError, InferenceRequest, OpenAIChatEngine,
};
use application::{
    error::ApplicationError,
    ports::{ChatPort, ChatReply},
};
use async_trait::async_trait;
use domain::ChatMessage;
use tracing::{debug, instrument, warn};

/// Adapter for hosted OpenAI chat completions
pub struct OpenAIChatAdapter {
    engine: Arc<dyn InferenceEngine>,
}

impl std::fmt::Debug for OpenAIChatAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIChatAdapter")
            .field("model", &self.engine.default_model())
            .finish_non_exhaustive()
    }
}

impl OpenAIChatAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: InferenceConfig) -> Result<Self, ApplicationError> {
        let engine = OpenAIChatEngine::new(config).map_err(Self::map_error)?;
        Ok(Self::with_engine(Arc::new(engine)))
    }

    /// Wrap an existing engine
    pub fn with_engine(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    /// Convert ai_core error to application error
    fn map_error(e: InferenceError) -> ApplicationError {
        match e {
            InferenceError::RateLimited => ApplicationError::RateLimited,
            InferenceError::Authentication(msg) => ApplicationError::Configuration(msg),
            InferenceError::ConnectionFailed(msg) => {
                ApplicationError::ExternalService(format!("Chat connection failed: {msg}"))
            },
            InferenceError::Timeout(ms) => {
                ApplicationError::ExternalService(format!("Chat timeout after {ms}ms"))
            },
            other => ApplicationError::Inference(other.to_string()),
        }
    }
}

#[async_trait]
impl ChatPort for OpenAIChatAdapter {
    #[instrument(skip(self, messages), fields(messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatReply, ApplicationError> {
        let start = Instant::now();

        let response = self
            .engine
            .generate(InferenceRequest::from_messages(messages))
            .await
            .map_err(Self::map_error)?;

        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = start.elapsed().as_millis() as u64;

        debug!(
            model = %response.model,
            tokens = ?response.usage.map(|u| u.total_tokens),
            latency_ms,
            "Chat completion finished"
        );

        Ok(ChatReply {
            content: response.content,
            model: response.model,
            tokens_used: response.usage.map(|u| u.total_tokens),
            latency_ms,
        })
    }

    async fn is_healthy(&self) -> bool {
        match self.engine.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(error = %e, "Chat health check failed");
                false
            },
        }
    }

    fn current_model(&self) -> String {
        self.engine.default_model().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_api_key() {
        let err = OpenAIChatAdapter::new(InferenceConfig::default()).unwrap_err();
        assert!(matches!(err, ApplicationError::Configuration(_)));
    }

    #[test]
    fn current_model_comes_from_config() {
        let adapter =
            OpenAIChatAdapter::new(InferenceConfig::default().with_api_key("sk-test")).unwrap();
        assert_eq!(adapter.current_model(), "gpt-3.5-turbo");
    }

    #[test]
    fn error_mapping() {
        assert!(matches!(
            OpenAIChatAdapter::map_error(InferenceError::RateLimited),
            ApplicationError::RateLimited
        ));
        assert!(matches!(
            OpenAIChatAdapter::map_error(InferenceError::Timeout(60000)),
            ApplicationError::ExternalService(_)
        ));
        assert!(matches!(
            OpenAIChatAdapter::map_error(InferenceError::ServerError("502".into())),
            ApplicationError::Inference(_)
        ));
        assert!(matches!(
            OpenAIChatAdapter::map_error(InferenceError::Authentication("bad key".into())),
            ApplicationError::Configuration(_)
        ));
    }
}
