//! HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::api::models::{ErrorResponse, RecognizeRequest, RecognizeResponse};
use crate::api::payload::decode_image_payload;
use crate::error::{AppError, Result};
use crate::metrics::METRICS;
use crate::recognition::fallback::truncate;
use crate::recognition::ModelFallback;

/// Message returned when the request carries no image
pub const NO_IMAGE_MESSAGE: &str = "No image data provided";

/// Characters of recognized text echoed into the log
const PREVIEW_CHARS: usize = 100;

/// Application state for the recognize handler
#[derive(Clone)]
pub struct AppState {
    pub recognizer: Arc<ModelFallback>,
    pub prompt: Arc<str>,
}

impl AppState {
    pub fn new(recognizer: ModelFallback, prompt: impl Into<Arc<str>>) -> Self {
        Self {
            recognizer: Arc::new(recognizer),
            prompt: prompt.into(),
        }
    }
}

/// Transcribe handwriting in an uploaded image
///
/// POST /api/recognize
pub async fn recognize(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RecognizeRequest>, JsonRejection>,
) -> Result<Json<RecognizeResponse>> {
    let start = Instant::now();
    let span = info_span!("recognize", request_id = %Uuid::new_v4());

    let result = transcribe(&state, payload).instrument(span.clone()).await;

    let status = match &result {
        Ok(_) => "success",
        Err(AppError::InvalidRequest(_)) | Err(AppError::PayloadTooLarge(_)) => "invalid",
        Err(_) => "error",
    };
    METRICS.record_recognize(status, start.elapsed().as_secs_f64());

    span.in_scope(|| match &result {
        Ok(_) => info!("OCR process finished, sending text to client"),
        Err(e) if status == "invalid" => warn!(error = %e, "OCR request rejected"),
        Err(e) => error!(error = %e, "OCR process failed"),
    });

    result.map(Json)
}

async fn transcribe(
    state: &AppState,
    payload: std::result::Result<Json<RecognizeRequest>, JsonRejection>,
) -> Result<RecognizeResponse> {
    info!("OCR backend process started");

    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::InvalidRequest(rejection.body_text())
        }
    })?;

    let image_data = match request.image {
        Some(data) if !data.is_empty() => data,
        _ => return Err(AppError::InvalidRequest(NO_IMAGE_MESSAGE.to_string())),
    };
    info!(payload_len = image_data.len(), "Received image data for OCR processing");

    let image = tokio::task::spawn_blocking(move || decode_image_payload(&image_data))
        .await
        .map_err(|e| AppError::Internal(format!("image decode task failed: {}", e)))??;
    info!(
        width = image.width,
        height = image.height,
        format = ?image.format,
        bytes = image.bytes.len(),
        "Image loaded successfully"
    );

    let recognition = state.recognizer.recognize(&image, &state.prompt).await?;

    info!(
        model = %recognition.model,
        chars = recognition.text.chars().count(),
        preview = %truncate(&recognition.text, PREVIEW_CHARS),
        "Extracted text"
    );

    Ok(RecognizeResponse::success(recognition.text))
}

/// Prometheus metrics
///
/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}

/// JSON 404 for anything no route or static file matched
pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::bare("Not found")))
}

/// Response for a panic inside a handler
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Unhandled server fault");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::bare("Internal server error")),
    )
        .into_response()
}
