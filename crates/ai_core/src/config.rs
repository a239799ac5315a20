//! Configuration for the chat completion engine

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Configuration for the inference engine
#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the OpenAI-compatible API (including the version segment)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as bearer token (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Default model to use
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum tokens to generate (provider default when unset)
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

const fn default_timeout_ms() -> u64 {
    60000 // 60 seconds
}

const fn default_temperature() -> f32 {
    0.9
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            default_model: default_model(),
            timeout_ms: default_timeout_ms(),
            max_tokens: None,
            temperature: default_temperature(),
        }
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("default_model", &self.default_model)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl InferenceConfig {
    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Whether a non-empty API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = InferenceConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.default_model, "gpt-3.5-turbo");
        assert_eq!(config.timeout_ms, 60000);
        assert!(config.max_tokens.is_none());
        assert!((config.temperature - 0.9).abs() < 0.01);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn config_deserialization_with_defaults() {
        let config: InferenceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout_ms, 60000);
    }

    #[test]
    fn config_deserialization_reads_api_key() {
        let json = r#"{"base_url":"http://custom:8080/v1","api_key":"sk-test"}"#;
        let config: InferenceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_url, "http://custom:8080/v1");
        assert!(config.has_api_key());
    }

    #[test]
    fn api_key_is_never_serialized() {
        let config = InferenceConfig::default().with_api_key("sk-secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(!json.contains("api_key"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = InferenceConfig::default().with_api_key("sk-secret");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = InferenceConfig::default().with_api_key("  ");
        assert!(!config.has_api_key());
    }
}
