//! Error types for the recognition server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::models::ErrorResponse;
use crate::api::payload::ImageError;
use crate::recognition::RecognitionError;

/// Request-level errors, mapped to JSON bodies at the handler boundary
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Decode(#[from] ImageError),

    #[error("No suitable OCR model found. Tried: {}", tried.join(", "))]
    NoModelAvailable { tried: Vec<String> },

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Decode(_) | AppError::NoModelAvailable { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<RecognitionError> for AppError {
    fn from(err: RecognitionError) -> Self {
        match err {
            RecognitionError::NoModelAvailable { tried } => AppError::NoModelAvailable { tried },
            // ModelFallback only yields NoModelAvailable; per-model errors
            // reach here only when a RecognitionService is called directly
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            // Validation failures carry no status marker
            AppError::InvalidRequest(message) | AppError::PayloadTooLarge(message) => {
                ErrorResponse::bare(message)
            }
            other => ErrorResponse::failed(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
