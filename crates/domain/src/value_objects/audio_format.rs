//! Audio container formats exchanged with the speech collaborators

use std::fmt;

use serde::{Deserialize, Serialize};

/// Format of the audio data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 format (synthesized speech)
    Mp3,
    /// WAV format
    Wav,
    /// OGG container
    Ogg,
    /// WebM container
    Webm,
    /// MP4/AAC audio
    M4a,
    /// FLAC format
    Flac,
}

impl AudioFormat {
    /// Get the MIME type for this format
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
            Self::Webm => "audio/webm",
            Self::M4a => "audio/mp4",
            Self::Flac => "audio/flac",
        }
    }

    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Webm => "webm",
            Self::M4a => "m4a",
            Self::Flac => "flac",
        }
    }

    /// Parse from MIME type, ignoring codec parameters
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let base = mime.split(';').next().unwrap_or(mime).trim();
        match base.to_ascii_lowercase().as_str() {
            "audio/mpeg" | "audio/mp3" => Some(Self::Mp3),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(Self::Wav),
            "audio/ogg" | "application/ogg" => Some(Self::Ogg),
            "audio/webm" | "video/webm" => Some(Self::Webm),
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "audio/aac" => Some(Self::M4a),
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
