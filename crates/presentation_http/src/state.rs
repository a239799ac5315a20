//! Application state shared across handlers

use std::sync::Arc;

use application::{ClipStorePort, ConversationService, HealthService, SpeechBridge};
use domain::PracticeSession;
use infrastructure::BrowserMicrophone;
use tokio::sync::Mutex;

/// Shared application state
///
/// One practice session per server; interactions on it are serialized by the
/// session lock.
#[derive(Clone)]
pub struct AppState {
    /// Selection, transcript and tutor instruction
    pub session: Arc<Mutex<PracticeSession>>,
    /// Turn orchestration
    pub conversation: Arc<ConversationService>,
    /// Microphone capture and recognition
    pub bridge: Arc<SpeechBridge>,
    /// Receives utterances uploaded by the page
    pub microphone: BrowserMicrophone,
    /// Synthesized speech clips
    pub clips: Arc<dyn ClipStorePort>,
    /// Collaborator health checks
    pub health: Arc<HealthService>,
}

impl AppState {
    pub fn new(
        conversation: Arc<ConversationService>,
        bridge: Arc<SpeechBridge>,
        microphone: BrowserMicrophone,
        clips: Arc<dyn ClipStorePort>,
        health: Arc<HealthService>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(PracticeSession::default())),
            conversation,
            bridge,
            microphone,
            clips,
            health,
        }
    }
}
