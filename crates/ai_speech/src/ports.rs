//! Port definitions for speech processing
//!
//! Defines the traits (ports) that speech processing adapters must implement.

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::types::{AudioData, AudioFormat, Transcription};

/// Port for Speech-to-Text (STT) implementations
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe audio with a language hint
    ///
    /// # Arguments
    ///
    /// * `audio` - Audio data to transcribe
    /// * `language` - ISO 639-1 language code (e.g., "en", "de", "es")
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if transcription fails.
    async fn transcribe_with_language(
        &self,
        audio: AudioData,
        language: &str,
    ) -> Result<Transcription, SpeechError>;

    /// Check if the STT service is available
    async fn is_available(&self) -> bool;

    /// Get the name of the current STT model
    fn model_name(&self) -> &str;
}

/// Port for Text-to-Speech (TTS) implementations
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Convert text to speech
    ///
    /// # Arguments
    ///
    /// * `text` - Text to synthesize
    /// * `voice` - Optional voice ID to use (uses default if None)
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails.
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<AudioData, SpeechError>;

    /// Convert text to speech with specific output format
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails or format is not supported.
    async fn synthesize_with_format(
        &self,
        text: &str,
        voice: Option<&str>,
        format: AudioFormat,
    ) -> Result<AudioData, SpeechError>;

    /// Voice configured for an ISO 639-1 language code
    fn voice_for_language(&self, language: &str) -> &str;

    /// Check if the TTS service is available
    async fn is_available(&self) -> bool;

    /// Get the name of the current TTS model
    fn model_name(&self) -> &str;

    /// Get the default voice ID
    fn default_voice(&self) -> &str;
}
