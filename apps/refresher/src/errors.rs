use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::refresh::SequenceError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Sequence(SequenceError::Busy) => StatusCode::CONFLICT,
            AppError::Sequence(SequenceError::Failed { step, cause }) => {
                tracing::error!("Manual run failed at {step}: {cause}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Plain text so the caller sees exactly what went wrong.
        (status, self.to_string()).into_response()
    }
}
