//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: OpenAI chat and speech
//! adapters, the browser-fed microphone, the temporary-file clip store and
//! the layered configuration.

pub mod adapters;
pub mod config;

pub use adapters::*;
pub use config::{
    API_KEY_ENV, AppConfig, ConfigurationError, LogFormat, MicrophoneConfig, ServerConfig,
};
