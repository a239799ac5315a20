//! Speech adapter - Implements the speech ports using ai_speech crate

use std::sync::Arc;

use ai_speech::{
    AudioData, AudioFormat as AiAudioFormat, OpenAISpeechProvider, SpeechConfig, SpeechError,
    SpeechToText, TextToSpeech,
};
use application::error::ApplicationError;
use application::ports::{
    CapturedAudio, SpeechRecognitionPort, SpeechSynthesisPort, SynthesizedSpeech,
    TranscriptionResult,
};
use async_trait::async_trait;
use domain::AudioFormat;
use tracing::{debug, instrument};

/// Adapter for speech services using ai_speech crate
pub struct SpeechAdapter {
    provider: Arc<OpenAISpeechProvider>,
}

impl std::fmt::Debug for SpeechAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechAdapter")
            .field("provider", &"OpenAISpeechProvider")
            .finish()
    }
}

impl SpeechAdapter {
    /// Create a new speech adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to initialize.
    pub fn new(config: SpeechConfig) -> Result<Self, ApplicationError> {
        let provider = OpenAISpeechProvider::new(config).map_err(Self::map_error)?;

        Ok(Self {
            provider: Arc::new(provider),
        })
    }

    /// Convert domain AudioFormat to ai_speech AudioFormat
    const fn domain_to_ai_format(format: AudioFormat) -> AiAudioFormat {
        match format {
            AudioFormat::Mp3 => AiAudioFormat::Mp3,
            AudioFormat::Wav => AiAudioFormat::Wav,
            AudioFormat::Ogg => AiAudioFormat::Ogg,
            AudioFormat::Webm => AiAudioFormat::Webm,
            AudioFormat::M4a => AiAudioFormat::M4a,
            AudioFormat::Flac => AiAudioFormat::Flac,
        }
    }

    /// Convert ai_speech AudioFormat to domain AudioFormat
    const fn ai_to_domain_format(format: AiAudioFormat) -> AudioFormat {
        match format {
            AiAudioFormat::Mp3 => AudioFormat::Mp3,
            AiAudioFormat::Wav => AudioFormat::Wav,
            // Raw opus is served in an ogg container
            AiAudioFormat::Opus | AiAudioFormat::Ogg => AudioFormat::Ogg,
            AiAudioFormat::Webm => AudioFormat::Webm,
            AiAudioFormat::M4a => AudioFormat::M4a,
            AiAudioFormat::Flac => AudioFormat::Flac,
        }
    }

    /// Map speech error to application error
    fn map_error(err: SpeechError) -> ApplicationError {
        if err.is_recognition_failure() {
            return ApplicationError::Recognition(err.to_string());
        }

        match err {
            SpeechError::Configuration(e) | SpeechError::Authentication(e) => {
                ApplicationError::Configuration(e)
            },
            SpeechError::RateLimited => ApplicationError::RateLimited,
            SpeechError::InvalidResponse(e) => {
                ApplicationError::ExternalService(format!("Invalid speech response: {e}"))
            },
            other => ApplicationError::ExternalService(other.to_string()),
        }
    }
}

#[async_trait]
impl SpeechSynthesisPort for SpeechAdapter {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn synthesize(
        &self,
        text: &str,
        speech_code: &str,
    ) -> Result<SynthesizedSpeech, ApplicationError> {
        let voice = self.provider.voice_for_language(speech_code);
        debug!(speech_code, voice, "Synthesizing speech");

        let audio = self
            .provider
            .synthesize(text, Some(voice))
            .await
            .map_err(Self::map_error)?;

        Ok(SynthesizedSpeech {
            format: Self::ai_to_domain_format(audio.format()),
            duration_ms: audio.duration_ms(),
            audio: audio.into_bytes().to_vec(),
        })
    }

    async fn is_available(&self) -> bool {
        TextToSpeech::is_available(self.provider.as_ref()).await
    }
}

#[async_trait]
impl SpeechRecognitionPort for SpeechAdapter {
    #[instrument(skip(self, audio), fields(format = %audio.format, bytes = audio.data.len()))]
    async fn transcribe(
        &self,
        audio: CapturedAudio,
        speech_code: &str,
    ) -> Result<TranscriptionResult, ApplicationError> {
        let data = AudioData::new(audio.data, Self::domain_to_ai_format(audio.format));

        let transcription = self
            .provider
            .transcribe_with_language(data, speech_code)
            .await
            .map_err(Self::map_error)?;

        debug!(
            text_len = transcription.text.len(),
            language = ?transcription.language,
            "Transcription complete"
        );

        Ok(TranscriptionResult {
            text: transcription.text,
            language: transcription.language,
            duration_ms: transcription.duration_ms,
        })
    }
}
