//! AI Speech - Speech-to-Text and Text-to-Speech abstractions
//!
//! Provides traits and implementations for speech processing:
//! - `SpeechToText` - Transcribe a spoken utterance to text (STT)
//! - `TextToSpeech` - Synthesize speech from text (TTS)
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//!
//! Both directions are language aware: transcription takes an ISO 639-1
//! hint, and synthesis picks a voice per language from the configuration.
//!
//! # Example
//!
//! ```ignore
//! use ai_speech::{OpenAISpeechProvider, SpeechToText, TextToSpeech, AudioData, AudioFormat};
//!
//! let provider = OpenAISpeechProvider::new(config)?;
//!
//! let audio = AudioData::new(bytes, AudioFormat::Webm);
//! let transcription = provider.transcribe_with_language(audio, "de").await?;
//!
//! let voice = provider.voice_for_language("de");
//! let speech = provider.synthesize("Guten Tag!", Some(voice)).await?;
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod providers;
pub mod types;

pub use config::SpeechConfig;
pub use error::SpeechError;
pub use ports::{SpeechToText, TextToSpeech};
pub use providers::openai::OpenAISpeechProvider;
pub use types::{AudioData, AudioFormat, Transcription};
