//! Types for speech processing
//!
//! Contains data structures for audio data, formats and transcriptions.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Raw Opus stream
    Opus,
    /// OGG container (Firefox MediaRecorder output)
    Ogg,
    /// MP3 format
    Mp3,
    /// WAV format (uncompressed)
    Wav,
    /// FLAC format (lossless)
    Flac,
    /// WebM container (Chromium MediaRecorder output)
    Webm,
    /// M4A/AAC format (Safari MediaRecorder output)
    M4a,
}

impl AudioFormat {
    /// Get the MIME type for this audio format
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Opus => "audio/opus",
            Self::Ogg => "audio/ogg",
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Flac => "audio/flac",
            Self::Webm => "audio/webm",
            Self::M4a => "audio/mp4",
        }
    }

    /// Get the file extension for this audio format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Opus => "opus",
            Self::Ogg => "ogg",
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Webm => "webm",
            Self::M4a => "m4a",
        }
    }

    /// Parse audio format from MIME type
    ///
    /// Codec parameters are ignored, so `audio/webm;codecs=opus` is WebM.
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let base_mime = mime.split(';').next().unwrap_or(mime).trim();

        match base_mime.to_ascii_lowercase().as_str() {
            "audio/opus" => Some(Self::Opus),
            "audio/ogg" | "application/ogg" => Some(Self::Ogg),
            "audio/mpeg" | "audio/mp3" => Some(Self::Mp3),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(Self::Wav),
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            "audio/webm" | "video/webm" => Some(Self::Webm),
            "audio/m4a" | "audio/mp4" | "audio/x-m4a" | "audio/aac" => Some(Self::M4a),
            _ => None,
        }
    }

    /// Check if the transcription API accepts this container
    #[must_use]
    pub const fn is_transcription_supported(&self) -> bool {
        !matches!(self, Self::Opus)
    }
}

/// Container for audio data with metadata
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Raw audio bytes
    data: Bytes,
    /// Audio format
    format: AudioFormat,
    /// Duration in milliseconds (if known)
    duration_ms: Option<u64>,
}

impl AudioData {
    /// Create new audio data
    #[must_use]
    pub fn new(data: impl Into<Bytes>, format: AudioFormat) -> Self {
        Self {
            data: data.into(),
            format,
            duration_ms: None,
        }
    }

    /// Create audio data with duration
    #[must_use]
    pub const fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Get the raw audio bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw audio bytes
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Get the audio format
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// Get the duration in milliseconds (if known)
    #[must_use]
    pub const fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    /// Get the size of the audio data in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if the audio data is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the MIME type for this audio
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Generate a filename with appropriate extension
    #[must_use]
    pub fn filename(&self, base: &str) -> String {
        format!("{}.{}", base, self.format.extension())
    }
}

/// Result of speech-to-text transcription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    /// Transcribed text
    pub text: String,
    /// Language hint or detected language (ISO 639-1 code)
    pub language: Option<String>,
    /// Duration of the audio in milliseconds
    pub duration_ms: Option<u64>,
}

impl Transcription {
    /// Create a simple transcription with just text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            duration_ms: None,
        }
    }

    /// Set the language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the duration
    #[must_use]
    pub const fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Check if transcription is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
