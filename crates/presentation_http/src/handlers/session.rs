//! Session selection handlers

use axum::{Json, extract::State};
use domain::{
    DomainError, Language, ListeningState, ProficiencyLevel, SelectionChange, SessionSelection,
    Topic,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{error::ApiError, state::AppState};

/// Partial selection update; absent fields keep their value
///
/// Values are selector labels such as `"German"` or `"Intermediate"`.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub proficiency_level: Option<String>,
}

impl SelectionRequest {
    /// Resolve the labels against the registry
    pub fn to_change(&self) -> Result<SelectionChange, DomainError> {
        Ok(SelectionChange {
            language: self
                .language
                .as_deref()
                .map(str::parse::<Language>)
                .transpose()?,
            topic: self.topic.as_deref().map(str::parse::<Topic>).transpose()?,
            proficiency_level: self
                .proficiency_level
                .as_deref()
                .map(str::parse::<ProficiencyLevel>)
                .transpose()?,
        })
    }
}

/// Current selection with its derived speech code
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    #[serde(flatten)]
    pub selection: SessionSelection,
    pub speech_code: &'static str,
    pub listening: ListeningState,
}

impl SelectionResponse {
    fn new(selection: SessionSelection, listening: ListeningState) -> Self {
        Self {
            speech_code: selection.speech_code(),
            selection,
            listening,
        }
    }
}

/// Read the current selection
pub async fn get_selection(State(state): State<AppState>) -> Json<SelectionResponse> {
    let selection = state.session.lock().await.selection;
    Json(SelectionResponse::new(selection, state.bridge.state()))
}

/// Change one or more selector axes
///
/// The change takes effect on the next start; an unknown label leaves the
/// selection untouched.
#[instrument(skip(state))]
pub async fn update_selection(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let change = request.to_change()?;

    let selection = {
        let mut session = state.session.lock().await;
        session.selection.apply(change);
        session.selection
    };

    info!(
        language = %selection.language,
        topic = %selection.topic,
        level = %selection.proficiency_level,
        "Selection changed"
    );

    Ok(Json(SelectionResponse::new(selection, state.bridge.state())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_changes_nothing() {
        let change = SelectionRequest::default().to_change().unwrap();
        assert_eq!(change, SelectionChange::default());
    }

    #[test]
    fn labels_resolve_to_values() {
        let request: SelectionRequest =
            serde_json::from_str(r#"{"language": "German", "proficiency_level": "Advanced"}"#)
                .unwrap();
        let change = request.to_change().unwrap();

        assert_eq!(change.language, Some(Language::German));
        assert_eq!(change.topic, None);
        assert_eq!(change.proficiency_level, Some(ProficiencyLevel::Advanced));
    }

    #[test]
    fn unknown_label_is_rejected() {
        let request = SelectionRequest {
            topic: Some("Cooking".to_string()),
            ..SelectionRequest::default()
        };
        assert!(matches!(
            request.to_change(),
            Err(DomainError::UnknownOption { .. })
        ));
    }

    #[test]
    fn response_is_flat() {
        let response = SelectionResponse::new(SessionSelection::default(), ListeningState::Idle);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["language"], "English");
        assert_eq!(json["speech_code"], "en");
        assert_eq!(json["listening"], "idle");
    }
}
