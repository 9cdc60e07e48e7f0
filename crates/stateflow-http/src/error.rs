//! HTTP error mapping.
//!
//! The core reports typed outcomes; this module maps them onto status codes
//! and a JSON error envelope so handlers can use `?` throughout.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use stateflow::{Error as CoreError, ValidationError};

/// A `Result` alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors rendered to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An outcome surfaced by the workflow core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A lookup that the core reports as plain `None`.
    #[error("{0} not found")]
    NotFound(String),
}

/// JSON error envelope.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Core(err) => match err {
                // Re-registering an id is a conflict, not a malformed request.
                CoreError::Validation(ValidationError::DuplicateDefinition(_)) => {
                    (StatusCode::CONFLICT, "DUPLICATE_DEFINITION")
                }
                CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                CoreError::EmptyInstanceId | CoreError::EmptyActionId => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST")
                }
                CoreError::DefinitionNotFound(_)
                | CoreError::InstanceNotFound(_)
                | CoreError::ActionNotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                CoreError::IllegalTransition(_) => (StatusCode::CONFLICT, "ILLEGAL_TRANSITION"),
                CoreError::NoInitialState(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        };

        let body = ErrorBody {
            error: self.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}
