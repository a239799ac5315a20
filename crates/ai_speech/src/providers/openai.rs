//! OpenAI Speech Provider
//!
//! Implements `SpeechToText` using the transcription endpoint and
//! `TextToSpeech` using the speech endpoint.
//!
//! # Supported Audio Formats
//!
//! ## STT
//! - mp3, mp4, m4a, wav, webm, ogg, flac
//!
//! ## TTS
//! - mp3, opus, aac, flac, wav

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::{SpeechToText, TextToSpeech};
use crate::types::{AudioData, AudioFormat, Transcription};

/// Character limit of the speech endpoint
const MAX_TTS_INPUT_CHARS: usize = 4096;

/// OpenAI speech provider implementing both STT and TTS
#[derive(Clone)]
pub struct OpenAISpeechProvider {
    client: Client,
    config: SpeechConfig,
}

impl std::fmt::Debug for OpenAISpeechProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAISpeechProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAISpeechProvider {
    /// Create a new speech provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn transport_error(&self, err: &reqwest::Error) -> SpeechError {
        SpeechError::from_transport(err, self.config.timeout_ms)
    }

    /// Convert response format string to AudioFormat
    fn response_format_to_audio_format(format: &str) -> AudioFormat {
        match format {
            "opus" => AudioFormat::Opus,
            "aac" => AudioFormat::M4a,
            "flac" => AudioFormat::Flac,
            "wav" => AudioFormat::Wav,
            _ => AudioFormat::Mp3,
        }
    }

    /// Convert AudioFormat to TTS response format string
    const fn audio_format_to_response_format(format: AudioFormat) -> &'static str {
        match format {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Opus | AudioFormat::Ogg | AudioFormat::Webm => "opus",
            AudioFormat::M4a => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
        }
    }

    fn check_audio(&self, audio: &AudioData) -> Result<(), SpeechError> {
        let max_ms = self.config.max_audio_duration_ms;
        if let Some(duration_ms) = audio.duration_ms().filter(|d| *d > max_ms) {
            return Err(SpeechError::AudioTooLong {
                duration_ms,
                max_ms,
            });
        }

        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }

        if !audio.format().is_transcription_supported() {
            return Err(SpeechError::InvalidAudio(format!(
                "Audio format {:?} is not supported for transcription",
                audio.format()
            )));
        }

        Ok(())
    }

    /// Map a non-success response to a speech error
    fn api_failure(
        status: StatusCode,
        body: &str,
        model: &str,
        fallback: fn(String) -> SpeechError,
    ) -> SpeechError {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return SpeechError::Authentication(format!("HTTP {status}"));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return SpeechError::RateLimited;
        }

        match serde_json::from_str::<ApiError>(body) {
            Ok(api_error) => match api_error.error.code.as_deref() {
                Some("rate_limit_exceeded") => SpeechError::RateLimited,
                Some("model_not_found") => SpeechError::ModelNotAvailable(model.to_string()),
                _ => fallback(api_error.error.message),
            },
            Err(_) => fallback(format!("HTTP {status}: {body}")),
        }
    }

    async fn request_transcription(
        &self,
        audio: AudioData,
        language: &str,
    ) -> Result<Transcription, SpeechError> {
        self.check_audio(&audio)?;

        let filename = audio.filename("utterance");
        let mime_type = audio.mime_type();

        let file_part = Part::stream(audio.into_bytes())
            .file_name(filename)
            .mime_str(mime_type)
            .map_err(|e| SpeechError::InvalidAudio(format!("Invalid MIME type: {e}")))?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.config.stt_model.clone())
            .text("language", language.to_string());

        let response = self
            .authorized(self.client.post(self.endpoint("audio/transcriptions")))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Transcription request failed");
            return Err(Self::api_failure(
                status,
                &error_body,
                &self.config.stt_model,
                SpeechError::TranscriptionFailed,
            ));
        }

        let whisper_response: WhisperResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        debug!(
            text_len = whisper_response.text.len(),
            language = ?whisper_response.language,
            "Transcription complete"
        );

        let mut transcription = Transcription::new(whisper_response.text.trim());
        if transcription.is_empty() {
            return Err(SpeechError::NoSpeechDetected);
        }
        transcription = transcription.with_language(language);

        if let Some(duration) = whisper_response.duration {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let duration_ms = (duration * 1000.0) as u64;
            transcription = transcription.with_duration(duration_ms);
        }

        Ok(transcription)
    }

    async fn models_reachable(&self) -> bool {
        match self
            .authorized(self.client.get(self.endpoint("models")))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Speech availability check failed: {}", e);
                false
            },
        }
    }
}

/// Transcription response
#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

/// TTS request body
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
}

/// API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

#[async_trait]
impl SpeechToText for OpenAISpeechProvider {
    #[instrument(skip(self, audio), fields(audio_size = audio.size_bytes(), language = %language))]
    async fn transcribe_with_language(
        &self,
        audio: AudioData,
        language: &str,
    ) -> Result<Transcription, SpeechError> {
        self.request_transcription(audio, language).await
    }

    async fn is_available(&self) -> bool {
        self.models_reachable().await
    }

    fn model_name(&self) -> &str {
        &self.config.stt_model
    }
}

#[async_trait]
impl TextToSpeech for OpenAISpeechProvider {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<AudioData, SpeechError> {
        self.synthesize_with_format(text, voice, self.config.output_format)
            .await
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), format = ?format))]
    async fn synthesize_with_format(
        &self,
        text: &str,
        voice: Option<&str>,
        format: AudioFormat,
    ) -> Result<AudioData, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Text cannot be empty".to_string(),
            ));
        }

        let chars = text.chars().count();
        if chars > MAX_TTS_INPUT_CHARS {
            return Err(SpeechError::SynthesisFailed(format!(
                "Text too long: {chars} characters exceeds {MAX_TTS_INPUT_CHARS} limit"
            )));
        }

        let voice = voice.unwrap_or(&self.config.default_voice);
        let response_format = Self::audio_format_to_response_format(format);
        debug!(voice, "Synthesizing speech");

        let request = TtsRequest {
            model: &self.config.tts_model,
            input: text,
            voice,
            response_format: Some(response_format),
            speed: if (self.config.speed - 1.0).abs() < f32::EPSILON {
                None
            } else {
                Some(self.config.speed)
            },
        };

        let response = self
            .authorized(self.client.post(self.endpoint("audio/speech")))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Speech synthesis request failed");
            let invalid_voice = serde_json::from_str::<ApiError>(&error_body)
                .is_ok_and(|e| e.error.code.as_deref() == Some("invalid_voice"));
            if invalid_voice {
                return Err(SpeechError::VoiceNotFound(voice.to_string()));
            }
            return Err(Self::api_failure(
                status,
                &error_body,
                &self.config.tts_model,
                SpeechError::SynthesisFailed,
            ));
        }

        let audio_bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to read audio: {e}")))?;

        debug!(audio_size = audio_bytes.len(), "Speech synthesis complete");

        let output_format = Self::response_format_to_audio_format(response_format);
        Ok(AudioData::new(audio_bytes, output_format))
    }

    fn voice_for_language(&self, language: &str) -> &str {
        self.config.voice_for(language)
    }

    async fn is_available(&self) -> bool {
        self.models_reachable().await
    }

    fn model_name(&self) -> &str {
        &self.config.tts_model
    }

    fn default_voice(&self) -> &str {
        &self.config.default_voice
    }
}
