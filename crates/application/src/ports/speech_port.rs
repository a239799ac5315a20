//! Speech ports - Interfaces for text-to-speech and speech-to-text

use async_trait::async_trait;
use domain::AudioFormat;
#[cfg(test)]
use mockall::automock;

use super::CapturedAudio;
use crate::error::ApplicationError;

/// Audio produced for one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedSpeech {
    /// Encoded audio bytes
    pub audio: Vec<u8>,
    /// Encoding of `audio`
    pub format: AudioFormat,
    /// Duration of audio in milliseconds (if known)
    pub duration_ms: Option<u64>,
}

/// Result of a transcription operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionResult {
    /// Transcribed text
    pub text: String,
    /// Language reported by the recognizer
    pub language: Option<String>,
    /// Duration of audio in milliseconds
    pub duration_ms: Option<u64>,
}

/// Port for speech synthesis
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechSynthesisPort: Send + Sync {
    /// Synthesize `text` with the voice configured for `speech_code`
    async fn synthesize(
        &self,
        text: &str,
        speech_code: &str,
    ) -> Result<SynthesizedSpeech, ApplicationError>;

    /// Check if synthesis is available
    async fn is_available(&self) -> bool;
}

/// Port for speech recognition
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechRecognitionPort: Send + Sync {
    /// Transcribe one captured utterance spoken in `speech_code`
    ///
    /// Fails with [`ApplicationError::Recognition`] when nothing intelligible
    /// was said.
    async fn transcribe(
        &self,
        audio: CapturedAudio,
        speech_code: &str,
    ) -> Result<TranscriptionResult, ApplicationError>;
}
