//! Application services - Use case implementations

mod conversation_service;
mod health_service;
mod speech_bridge;

pub use conversation_service::{ConversationConfig, ConversationService, TurnOutcome};
pub use health_service::{HealthConfig, HealthReport, HealthService, ServiceHealth};
pub use speech_bridge::{
    DEFAULT_LISTEN_TIMEOUT, ListeningControl, ListeningGuard, SpeechBridge, ToggleOutcome,
};
