//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod browser_microphone;
mod openai_chat_adapter;
mod speech_adapter;
mod temp_file_clip_store;

pub use browser_microphone::BrowserMicrophone;
pub use openai_chat_adapter::OpenAIChatAdapter;
pub use speech_adapter::SpeechAdapter;
pub use temp_file_clip_store::TempFileClipStore;
