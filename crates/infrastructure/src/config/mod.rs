//! Application configuration
//!
//! Layered as defaults, then an optional `config.toml`, then `POLYGLOT_*`
//! environment variables (`__` separates nested keys, e.g.
//! `POLYGLOT_SERVER__PORT=8080`).
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `microphone`: capture timeout

mod microphone;
mod server;

use ai_core::InferenceConfig;
use ai_speech::SpeechConfig;
use application::{ConversationConfig, HealthConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use microphone::MicrophoneConfig;
pub use server::{LogFormat, ServerConfig};

/// Environment variable holding the OpenAI API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "POLYGLOT";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Errors raised while assembling the configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// No API key was provided anywhere
    #[error("No OpenAI API key configured: set OPENAI_API_KEY or POLYGLOT_INFERENCE__API_KEY")]
    MissingApiKey,

    /// A section failed validation
    #[error("Invalid {section} configuration: {reason}")]
    Invalid {
        section: &'static str,
        reason: String,
    },
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat completion configuration
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Speech synthesis and recognition configuration
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Conversation behavior
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Microphone capture
    #[serde(default)]
    pub microphone: MicrophoneConfig,

    /// Health check configuration
    #[serde(default)]
    pub health: HealthConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional file
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::build(config::File::with_name("config").required(false))
    }

    /// Load configuration from a TOML document, still honoring the environment
    pub fn from_toml(document: &str) -> Result<Self, ConfigurationError> {
        Self::build(config::File::from_str(document, config::FileFormat::Toml))
    }

    fn build<S>(file: S) -> Result<Self, ConfigurationError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .set_default("server.port", 3000)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Install the API key into the chat and speech sections
    ///
    /// A key already present in the inference section wins over `env_key`.
    /// The speech section falls back to the chat key when it has none.
    pub fn resolve_api_key(&mut self, env_key: Option<String>) -> Result<(), ConfigurationError> {
        let key = self
            .inference
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().to_string())
            .or(env_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigurationError::MissingApiKey)?;

        if self
            .speech
            .api_key
            .as_ref()
            .is_none_or(|existing| existing.expose_secret().trim().is_empty())
        {
            debug!("Using chat API key for speech");
            self.speech.api_key = Some(SecretString::from(key.clone()));
        }
        self.inference.api_key = Some(SecretString::from(key));
        Ok(())
    }

    /// Check every section before the server starts
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.inference.has_api_key() {
            return Err(ConfigurationError::MissingApiKey);
        }

        self.speech
            .validate()
            .map_err(|reason| ConfigurationError::Invalid {
                section: "speech",
                reason,
            })?;

        if self.microphone.listen_timeout_secs == 0 {
            return Err(ConfigurationError::Invalid {
                section: "microphone",
                reason: "listen_timeout_secs must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
