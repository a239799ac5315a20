//! Speech clip playback

use axum::{
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};
use domain::ClipId;
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

/// Serve a stored speech clip with its audio MIME type
#[instrument(skip(state))]
pub async fn get_clip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let clip_id =
        ClipId::parse(&id).map_err(|e| ApiError::BadRequest(format!("Invalid clip ID: {e}")))?;

    let clip = state
        .clips
        .load(clip_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No speech clip {clip_id}")))?;

    Ok((
        [
            (CONTENT_TYPE, clip.mime_type()),
            (CACHE_CONTROL, "private, max-age=3600"),
        ],
        clip.audio,
    ))
}
