//! Health check handlers

use application::{HealthReport, ServiceHealth};
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness check - is the server running?
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// True when the chat collaborator answers
    pub ready: bool,
    pub chat: ServiceHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<ServiceHealth>,
}

impl From<HealthReport> for ReadinessResponse {
    fn from(mut report: HealthReport) -> Self {
        let chat = report
            .services
            .remove("chat")
            .unwrap_or_else(|| ServiceHealth::unhealthy("Chat not checked"));
        Self {
            ready: chat.healthy,
            chat,
            speech: report.services.remove("speech"),
        }
    }
}

/// Readiness check - is the chat collaborator reachable?
///
/// Speech status is reported but does not gate readiness.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let response = ReadinessResponse::from(state.health.check_all().await);

    let status_code = if response.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
