//! Conversation handlers

use application::TurnOutcome;
use axum::{Json, extract::State, http::StatusCode};
use domain::{SessionSelection, Turn};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

/// Transcript snapshot
#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub selection: SessionSelection,
    /// Whether a start has set the tutor instruction
    pub started: bool,
    pub turns: Vec<Turn>,
}

/// Text message body
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Learner message
    pub message: String,
}

/// Read the transcript in append order
pub async fn get_conversation(State(state): State<AppState>) -> Json<TranscriptResponse> {
    let session = state.session.lock().await;
    Json(TranscriptResponse {
        selection: session.selection,
        started: session.instruction.is_some(),
        turns: session.log.snapshot().cloned().collect(),
    })
}

/// Empty the transcript and drop its speech clips
#[instrument(skip(state))]
pub async fn clear_conversation(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    let mut session = state.session.lock().await;
    state.conversation.clear(&mut session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Open the conversation for the current selection
#[instrument(skip(state))]
pub async fn start_conversation(
    State(state): State<AppState>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let mut session = state.session.lock().await;
    let outcome = state.conversation.start(&mut session).await?;
    Ok(Json(outcome))
}

/// Submit typed text
#[instrument(skip(state, request), fields(message_len = request.message.len()))]
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let mut session = state.session.lock().await;
    let outcome = state
        .conversation
        .submit_text(&mut session, &request.message)
        .await?;
    Ok(Json(outcome))
}
