//! Configuration for speech processing

use std::{collections::HashMap, fmt};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::types::AudioFormat;

/// Configuration for speech processing services
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// API key (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// API base URL (for custom endpoints)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Speech-to-text model
    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    /// Text-to-speech model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Voice used when a language has no entry in `voices`
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Voice per ISO 639-1 speech code
    #[serde(default)]
    pub voices: HashMap<String, String>,

    /// Output audio format for TTS
    #[serde(default = "default_output_format")]
    pub output_format: AudioFormat,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum audio duration in milliseconds
    #[serde(default = "default_max_audio_duration_ms")]
    pub max_audio_duration_ms: u64,

    /// TTS speaking speed (0.25 to 4.0)
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Number of synthesized clips kept for playback
    #[serde(default = "default_max_retained_clips")]
    pub max_retained_clips: usize,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_voice() -> String {
    "nova".to_string()
}

const fn default_output_format() -> AudioFormat {
    AudioFormat::Mp3
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

const fn default_max_audio_duration_ms() -> u64 {
    120_000 // 2 minutes
}

const fn default_speed() -> f32 {
    1.0
}

const fn default_max_retained_clips() -> usize {
    32
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            stt_model: default_stt_model(),
            tts_model: default_tts_model(),
            default_voice: default_voice(),
            voices: HashMap::new(),
            output_format: default_output_format(),
            timeout_ms: default_timeout_ms(),
            max_audio_duration_ms: default_max_audio_duration_ms(),
            speed: default_speed(),
            max_retained_clips: default_max_retained_clips(),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("base_url", &self.base_url)
            .field("stt_model", &self.stt_model)
            .field("tts_model", &self.tts_model)
            .field("default_voice", &self.default_voice)
            .field("voices", &self.voices)
            .field("output_format", &self.output_format)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_audio_duration_ms", &self.max_audio_duration_ms)
            .field("speed", &self.speed)
            .field("max_retained_clips", &self.max_retained_clips)
            .finish()
    }
}

impl SpeechConfig {
    /// Create a minimal config for testing
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            api_key: Some(SecretString::from("test-key")),
            ..Default::default()
        }
    }

    /// Voice for a speech code, falling back to the default voice
    pub fn voice_for(&self, language: &str) -> &str {
        self.voices
            .get(language)
            .map_or(self.default_voice.as_str(), String::as_str)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self
            .api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
        {
            return Err("API key is required for the speech provider".to_string());
        }

        if !(0.25..=4.0).contains(&self.speed) {
            return Err(format!(
                "Speed must be between 0.25 and 4.0, got {}",
                self.speed
            ));
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.max_audio_duration_ms == 0 {
            return Err("Max audio duration must be greater than 0".to_string());
        }

        if self.max_retained_clips == 0 {
            return Err("Max retained clips must be greater than 0".to_string());
        }

        Ok(())
    }
}
