use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use battsim_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and implements [`IntoResponse`] to produce
/// consistent `{ "error": ..., "code": ... }` JSON bodies. Validation
/// failures map to 4xx; anything the submitter cannot fix maps to 5xx.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `battsim_core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Core(core) = self;
        let (status, code, message) = match &core {
            CoreError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", core.to_string()),
            CoreError::Solver(_) | CoreError::Timeout(_) => {
                // Solver outcomes normally travel via callback; reaching
                // here means a handler surfaced one synchronously.
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SOLVER_ERROR",
                    core.to_string(),
                )
            }
            CoreError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
