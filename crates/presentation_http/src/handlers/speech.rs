//! Speech input handlers
//!
//! `POST /v1/speech/toggle` while Idle opens the microphone and waits for the
//! page to upload one utterance to `POST /v1/speech/utterance`. A second
//! toggle while Listening stops the capture and the waiting request returns
//! `cancelled`.

use application::{CapturedAudio, ToggleOutcome};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
};
use bytes::Bytes;
use domain::{AudioFormat, ListeningState};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{error::ApiError, state::AppState};

/// Listening state response
#[derive(Debug, Serialize)]
pub struct SpeechStatusResponse {
    pub state: ListeningState,
    /// Whether an upload would be accepted right now
    pub accepting_audio: bool,
}

/// Report whether speech recognition is listening
pub async fn speech_status(State(state): State<AppState>) -> Json<SpeechStatusResponse> {
    Json(SpeechStatusResponse {
        state: state.bridge.state(),
        accepting_audio: state.microphone.is_open(),
    })
}

/// Start or stop speech recognition
#[instrument(skip(state))]
pub async fn toggle_speech(
    State(state): State<AppState>,
) -> Result<Json<ToggleOutcome>, ApiError> {
    let outcome = state
        .bridge
        .toggle(&state.session, &state.conversation)
        .await?;
    Ok(Json(outcome))
}

/// Audio format of an upload from its `Content-Type`
pub fn upload_format(headers: &HeaderMap) -> Result<AudioFormat, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing Content-Type".to_string()))?;

    AudioFormat::from_mime_type(content_type)
        .ok_or_else(|| ApiError::BadRequest(format!("Unsupported audio type: {content_type}")))
}

/// Accept one utterance recorded by the page
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn upload_utterance(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let format = upload_format(&headers)?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("Utterance is empty".to_string()));
    }

    state
        .microphone
        .deliver(CapturedAudio::new(body.to_vec(), format))?;
    debug!(%format, "Utterance accepted");

    Ok(StatusCode::ACCEPTED)
}
