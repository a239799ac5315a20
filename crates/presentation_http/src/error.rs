//! API error handling
//!
//! Every failure leaves the handler as a JSON body `{error, code, details?}`.
//! Internal failures are logged and answered with a generic message.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Speech not recognized: {0}")]
    Unrecognized(String),

    #[error("Upstream failure: {0}")]
    BadGateway(String),

    #[error("Configuration error: {0}")]
    Misconfigured(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional error details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unrecognized(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Misconfigured(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Unrecognized(_) => "speech_not_recognized",
            Self::BadGateway(_) => "collaborator_error",
            Self::Misconfigured(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Unrecognized(msg) => (msg, None),
            Self::BadGateway(msg) => {
                warn!(error = %msg, "Collaborator failed");
                ("A speech or chat service failed".to_string(), Some(msg))
            },
            Self::Misconfigured(msg) => {
                error!(error = %msg, "Server misconfigured");
                ("The server is misconfigured".to_string(), Some(msg))
            },
            Self::Internal(msg) => {
                error!(error = %msg, "Internal error");
                ("An internal error occurred".to_string(), None)
            },
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e) => e.into(),
            ApplicationError::Recognition(msg) => Self::Unrecognized(msg),
            ApplicationError::Inference(msg) | ApplicationError::ExternalService(msg) => {
                Self::BadGateway(msg)
            },
            ApplicationError::RateLimited => {
                Self::BadGateway("rate limited by the OpenAI API".to_string())
            },
            ApplicationError::Conflict(msg) => Self::Conflict(msg),
            ApplicationError::NotFound(msg) => Self::NotFound(msg),
            ApplicationError::Configuration(msg) => Self::Misconfigured(msg),
            ApplicationError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<domain::DomainError> for ApiError {
    fn from(err: domain::DomainError) -> Self {
        match err {
            domain::DomainError::PromptTemplate(msg) => Self::Internal(msg),
            other => Self::BadRequest(other.to_string()),
        }
    }
}
