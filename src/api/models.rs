//! Request and response bodies for the HTTP API

use serde::{Deserialize, Serialize};

/// Body of `POST /api/recognize`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognizeRequest {
    /// Raw base64 or a `data:image/...;base64,` URL
    #[serde(default)]
    pub image: Option<String>,
}

/// Response status marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Successful transcription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizeResponse {
    pub text: String,
    pub status: ResponseStatus,
}

impl RecognizeResponse {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: ResponseStatus::Success,
        }
    }
}

/// Error body shared by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,
}

impl ErrorResponse {
    /// Error without a status marker (validation, routing)
    pub fn bare(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            status: None,
        }
    }

    /// Error from a failed recognition
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            status: Some(ResponseStatus::Error),
        }
    }
}
