//! Speech processing errors

use thiserror::Error;

/// Errors that can occur during speech processing
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Failed to connect to speech service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to speech service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Invalid audio format or corrupted data
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    /// Audio too long for processing
    #[error("Audio too long: {duration_ms}ms exceeds maximum of {max_ms}ms")]
    AudioTooLong {
        /// Duration of the provided audio
        duration_ms: u64,
        /// Maximum allowed duration
        max_ms: u64,
    },

    /// The service understood no words in the audio
    #[error("No speech detected")]
    NoSpeechDetected,

    /// Transcription failed
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    /// Synthesis failed
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Invalid response from service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during processing
    #[error("Speech processing timeout after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// API key missing or rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Voice not found
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

impl SpeechError {
    /// Classify a transport-level failure
    pub fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }

    /// Whether the failure is about the audio content rather than the service
    pub const fn is_recognition_failure(&self) -> bool {
        matches!(
            self,
            Self::NoSpeechDetected | Self::InvalidAudio(_) | Self::AudioTooLong { .. }
        )
    }
}
