//! HTTP client for the Polyglot server API

use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors talking to the server
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached or answered garbage
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body
    #[error("{message} (HTTP {status}, {code})")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
    #[serde(default)]
    details: Option<String>,
}

/// One transcript turn
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TurnView {
    pub sender: String,
    pub content: String,
}

/// Turns appended by one interaction
#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeView {
    pub turns: Vec<TurnView>,
    pub model: String,
    pub latency_ms: u64,
}

/// Transcript snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptView {
    pub turns: Vec<TurnView>,
}

/// Language option
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageView {
    pub display_name: String,
    pub speech_code: String,
}

/// Selector options
#[derive(Debug, Clone, Deserialize)]
pub struct OptionsView {
    pub languages: Vec<LanguageView>,
    pub topics: Vec<String>,
    pub proficiency_levels: Vec<String>,
}

/// Partial selection change
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency_level: Option<String>,
}

impl SelectionUpdate {
    pub const fn is_empty(&self) -> bool {
        self.language.is_none() && self.topic.is_none() && self.proficiency_level.is_none()
    }
}

/// Client for a running server
#[derive(Debug, Clone)]
pub struct PolyglotClient {
    http: reqwest::Client,
    base_url: String,
}

impl PolyglotClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Readiness report; a not-ready server still yields its report
    #[instrument(skip(self))]
    pub async fn status(&self) -> Result<(bool, Value), ClientError> {
        let response = self.http.get(self.endpoint_url("/ready")).send().await?;
        let status = response.status();
        if status.is_success() || status == StatusCode::SERVICE_UNAVAILABLE {
            Ok((status.is_success(), response.json().await?))
        } else {
            Err(Self::api_error(response).await)
        }
    }

    pub async fn options(&self) -> Result<OptionsView, ClientError> {
        let response = self.http.get(self.endpoint_url("/v1/options")).send().await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn update_selection(&self, update: &SelectionUpdate) -> Result<Value, ClientError> {
        let response = self
            .http
            .put(self.endpoint_url("/v1/session/selection"))
            .json(update)
            .send()
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<OutcomeView, ClientError> {
        let response = self
            .http
            .post(self.endpoint_url("/v1/conversation/start"))
            .send()
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn say(&self, text: &str) -> Result<OutcomeView, ClientError> {
        let response = self
            .http
            .post(self.endpoint_url("/v1/conversation/messages"))
            .json(&serde_json::json!({ "message": text }))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn transcript(&self) -> Result<TranscriptView, ClientError> {
        let response = self
            .http
            .get(self.endpoint_url("/v1/conversation"))
            .send()
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.endpoint_url("/v1/conversation"))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn api_error(response: Response) -> ClientError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        debug!(%status, body = %text, "Server returned an error");

        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => ClientError::Api {
                status,
                code: body.code,
                message: body
                    .details
                    .map_or_else(|| body.error.clone(), |d| format!("{}: {d}", body.error)),
            },
            Err(_) => ClientError::Api {
                status,
                code: "unknown".to_string(),
                message: text,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = PolyglotClient::new("http://localhost:3000/");
        assert_eq!(
            client.endpoint_url("/v1/options"),
            "http://localhost:3000/v1/options"
        );
    }

    #[test]
    fn empty_selection_update_serializes_to_empty_object() {
        let update = SelectionUpdate::default();
        assert!(update.is_empty());
        assert_eq!(serde_json::to_string(&update).unwrap(), "{}");
    }

    #[test]
    fn partial_selection_update() {
        let update = SelectionUpdate {
            topic: Some("Art".to_string()),
            ..SelectionUpdate::default()
        };
        assert!(!update.is_empty());
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"topic":"Art"}"#);
    }
}
