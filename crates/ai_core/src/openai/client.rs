//! Chat completions client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::InferenceConfig,
    error::InferenceError,
    ports::{InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage},
};

/// Inference engine backed by a hosted OpenAI-compatible API
pub struct OpenAIChatEngine {
    client: Client,
    config: InferenceConfig,
}

impl std::fmt::Debug for OpenAIChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIChatEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAIChatEngine {
    /// Create a new chat engine
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        if !config.has_api_key() {
            return Err(InferenceError::Authentication(
                "API key is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            "Initialized chat completion engine"
        );

        Ok(Self { client, config })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    /// Get the model to use for a request
    fn resolve_model<'a>(&'a self, request: &'a InferenceRequest) -> &'a str {
        request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model)
    }

    fn transport_error(&self, err: &reqwest::Error) -> InferenceError {
        InferenceError::from_transport(err, self.config.timeout_ms)
    }
}

/// Chat completions request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [InferenceMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat completions response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// API error envelope
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Map a non-success response to an inference error
fn status_error(status: StatusCode, body: &str, model: &str) -> InferenceError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map_or_else(|_| body.to_string(), |e| e.error.message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => InferenceError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => InferenceError::RateLimited,
        StatusCode::NOT_FOUND => InferenceError::ModelNotAvailable(format!("{model}: {message}")),
        s if s.is_server_error() => InferenceError::ServerError(format!("Status {s}: {message}")),
        s => InferenceError::RequestFailed(format!("Status {s}: {message}")),
    }
}

#[async_trait]
impl InferenceEngine for OpenAIChatEngine {
    #[instrument(skip(self, request), fields(model = %self.resolve_model(&request), messages = request.messages.len()))]
    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        let model = self.resolve_model(&request);

        let body = ChatCompletionRequest {
            model,
            messages: &request.messages,
            temperature: request.temperature.unwrap_or(self.config.temperature),
            max_tokens: request.max_tokens.or(self.config.max_tokens),
        };

        debug!("Sending chat completion request");

        let response = self
            .authorized(self.client.post(self.api_url("chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Chat completion request failed");
            return Err(status_error(status, &body, model));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::InvalidResponse("response has no choices".into()))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| InferenceError::InvalidResponse("choice has no content".into()))?;

        debug!(tokens = ?completion.usage, "Chat completion finished");

        Ok(InferenceResponse {
            content,
            model: completion.model,
            usage: completion.usage,
            finish_reason: choice.finish_reason,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, InferenceError> {
        let response = self
            .authorized(self.client.get(self.api_url("models")))
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) if e.is_timeout() || e.is_connect() => Ok(false),
            Err(e) => Err(InferenceError::RequestFailed(e.to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn list_models(&self) -> Result<Vec<String>, InferenceError> {
        let response = self
            .authorized(self.client.get(self.api_url("models")))
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body, &self.config.default_model));
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        Ok(models.data.into_iter().map(|m| m.id).collect())
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> OpenAIChatEngine {
        OpenAIChatEngine::new(InferenceConfig::default().with_api_key("sk-test")).unwrap()
    }

    #[test]
    fn config_creates_correct_urls() {
        let engine = engine();
        assert_eq!(
            engine.api_url("chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(engine.api_url("/models"), "https://api.openai.com/v1/models");
    }

    #[test]
    fn trailing_slash_in_base_url_is_ignored() {
        let config = InferenceConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..InferenceConfig::default()
        }
        .with_api_key("sk-test");
        let engine = OpenAIChatEngine::new(config).unwrap();
        assert_eq!(engine.api_url("models"), "http://localhost:8080/v1/models");
    }

    #[test]
    fn new_requires_api_key() {
        let err = OpenAIChatEngine::new(InferenceConfig::default()).unwrap_err();
        assert!(matches!(err, InferenceError::Authentication(_)));
    }

    #[test]
    fn default_model_is_gpt_35() {
        assert_eq!(engine().default_model(), "gpt-3.5-turbo");
    }

    #[test]
    fn status_error_parses_api_envelope() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        let err = status_error(StatusCode::UNAUTHORIZED, body, "gpt-3.5-turbo");
        assert!(
            matches!(err, InferenceError::Authentication(msg) if msg == "Incorrect API key provided")
        );
    }

    #[test]
    fn status_error_maps_rate_limit_and_server_errors() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "", "m"),
            InferenceError::RateLimited
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "upstream down", "m"),
            InferenceError::ServerError(msg) if msg.contains("upstream down")
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "", "gpt-x"),
            InferenceError::ModelNotAvailable(msg) if msg.starts_with("gpt-x")
        ));
    }
}
