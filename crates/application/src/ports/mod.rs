//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod chat_port;
mod clip_store_port;
mod microphone_port;
mod speech_port;

pub use chat_port::{ChatPort, ChatReply};
#[cfg(test)]
pub use chat_port::MockChatPort;
pub use clip_store_port::{ClipInfo, ClipStorePort, SpeechClip};
#[cfg(test)]
pub use clip_store_port::MockClipStorePort;
pub use microphone_port::{AudioSource, CapturedAudio, MicrophonePort};
#[cfg(test)]
pub use microphone_port::MockMicrophonePort;
pub use speech_port::{
    SpeechRecognitionPort, SpeechSynthesisPort, SynthesizedSpeech, TranscriptionResult,
};
#[cfg(test)]
pub use speech_port::{MockSpeechRecognitionPort, MockSpeechSynthesisPort};
