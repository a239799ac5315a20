//! AI Core - Chat completion engine
//!
//! Provides the abstraction for LLM chat inference and a client for hosted
//! OpenAI-compatible chat completion endpoints.

pub mod config;
pub mod error;
pub mod openai;
pub mod ports;

pub use config::InferenceConfig;
pub use error::InferenceError;
pub use openai::OpenAIChatEngine;
pub use ports::{InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage};
