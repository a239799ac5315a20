//! Route definitions

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::{handlers, state::AppState};

/// Request body limits
#[derive(Debug, Clone, Copy)]
pub struct BodyLimits {
    /// JSON requests
    pub json_bytes: usize,
    /// Utterance uploads
    pub audio_bytes: usize,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self {
            json_bytes: 1024 * 1024,
            audio_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Create the main router with default body limits
pub fn create_router(state: AppState) -> Router {
    create_router_with_limits(state, BodyLimits::default())
}

/// Create the main router with all routes
pub fn create_router_with_limits(state: AppState, limits: BodyLimits) -> Router {
    Router::new()
        // Page
        .route("/", get(handlers::page::index))
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Selector API (v1)
        .route("/v1/options", get(handlers::options::list_options))
        .route(
            "/v1/session/selection",
            get(handlers::session::get_selection).put(handlers::session::update_selection),
        )
        // Conversation API (v1)
        .route(
            "/v1/conversation",
            get(handlers::conversation::get_conversation)
                .delete(handlers::conversation::clear_conversation),
        )
        .route(
            "/v1/conversation/start",
            post(handlers::conversation::start_conversation),
        )
        .route(
            "/v1/conversation/messages",
            post(handlers::conversation::send_message),
        )
        // Speech API (v1)
        .route("/v1/speech/status", get(handlers::speech::speech_status))
        .route("/v1/speech/toggle", post(handlers::speech::toggle_speech))
        .route(
            "/v1/speech/utterance",
            post(handlers::speech::upload_utterance)
                .layer(DefaultBodyLimit::max(limits.audio_bytes)),
        )
        .route("/v1/audio/{id}", get(handlers::audio::get_clip))
        .layer(DefaultBodyLimit::max(limits.json_bytes))
        .layer(RequestBodyLimitLayer::new(
            limits.audio_bytes.max(limits.json_bytes),
        ))
        // Attach state
        .with_state(state)
}
