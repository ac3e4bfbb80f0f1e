//! Recognition service abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::payload::DecodedImage;

/// Generation method a model must support to be usable for transcription
pub const GENERATE_CONTENT: &str = "generateContent";

/// Recognition error types
#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model {model} failed: {message}")]
    ModelInvocation { model: String, message: String },

    #[error("No suitable OCR model found. Tried: {}", tried.join(", "))]
    NoModelAvailable { tried: Vec<String> },
}

impl From<reqwest::Error> for RecognitionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RecognitionError::Timeout(e.to_string())
        } else if e.is_decode() {
            RecognitionError::InvalidResponse(e.to_string())
        } else {
            RecognitionError::RequestFailed(e.to_string())
        }
    }
}

/// Catalog entry for a model exposed by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_CONTENT)
    }
}

/// A remote multimodal model endpoint
///
/// Implemented by the Gemini HTTP client and by test doubles.
#[async_trait]
pub trait RecognitionService: Send + Sync {
    /// Run `prompt` against `image` on `model` and return the generated text
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: &DecodedImage,
    ) -> Result<String, RecognitionError>;

    /// List the models the service exposes
    async fn list_models(&self) -> Result<Vec<ModelInfo>, RecognitionError>;
}
