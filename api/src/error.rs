//! Public application error type for the two entry façades (§6). Maps the
//! pipeline's surface-level error taxonomy (§7) onto HTTP status codes; every
//! component error converts into [`orchestrator_core::OrchestratorError`]
//! first, so this is the single place that knows about status codes.

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use orchestrator_core::OrchestratorError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Core(#[from] OrchestratorError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "ValidationError"),
            AppError::Core(OrchestratorError::Validation(_)) => (StatusCode::BAD_REQUEST, "ValidationError"),
            AppError::Core(OrchestratorError::Authentication) => (StatusCode::UNAUTHORIZED, "AuthenticationError"),
            AppError::Core(OrchestratorError::Forbidden) => (StatusCode::FORBIDDEN, "Forbidden"),
            AppError::Core(OrchestratorError::NotFound(_)) => (StatusCode::NOT_FOUND, "NotFound"),
            AppError::Core(OrchestratorError::Encoding(_)) => (StatusCode::UNPROCESSABLE_ENTITY, "EncodingError"),
            AppError::Core(OrchestratorError::Store(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "Unknown"),
            AppError::Core(OrchestratorError::Unknown(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "Unknown"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Unknown"),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            error: code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
