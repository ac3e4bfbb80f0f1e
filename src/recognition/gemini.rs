//! Gemini REST client (v1beta `generateContent` and model catalog)

use super::config::RecognitionConfig;
use super::service::{ModelInfo, RecognitionError, RecognitionService};
use crate::api::payload::DecodedImage;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gemini API client
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
    catalog_max_pages: usize,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: &RecognitionConfig, api_key: SecretString) -> Result<Self, RecognitionError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| RecognitionError::RequestFailed(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            catalog_max_pages: config.catalog_max_pages.max(1),
        })
    }

    fn generate_url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Turn a non-2xx response into an upstream error with the body attached
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RecognitionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(RecognitionError::UpstreamError(format!(
            "Status {}: {}",
            status, error_text
        )))
    }
}

#[async_trait]
impl RecognitionService for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: &DecodedImage,
    ) -> Result<String, RecognitionError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type().to_string(),
                            data: image.to_base64(),
                        },
                    },
                ],
            }],
        };

        debug!(model = %model, bytes = image.bytes.len(), "Calling generateContent");

        let response = self
            .http
            .post(self.generate_url(model))
            .query(&[("key", self.api_key.expose_secret())])
            .json(&request_body)
            .send()
            .await?;

        let response: GenerateContentResponse = Self::check_status(response).await?.json().await?;

        response.text().ok_or_else(|| {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no text in response".to_string());
            RecognitionError::ModelInvocation {
                model: model.to_string(),
                message: reason,
            }
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, RecognitionError> {
        let url = format!("{}/v1beta/models", self.base_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..self.catalog_max_pages {
            let mut req = self
                .http
                .get(&url)
                .query(&[("key", self.api_key.expose_secret())]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token)]);
            }

            let page: ListModelsResponse = Self::check_status(req.send().await?).await?.json().await?;
            models.extend(page.models);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Model catalog returned {} entries", models.len());
        Ok(models)
    }
}

// Wire types for the Gemini API
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

/// Response part; only text is read, other part kinds are skipped
#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}
