use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};

use handwriting_ocr::{
    api::{build_router, AppState},
    config::{Config, LoggingConfig},
    logging::init_tracing,
    recognition::{GeminiClient, ModelFallback},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            // No config yet, so log with defaults before bailing out
            init_tracing(&LoggingConfig::default());
            error!("{}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);

    let Config {
        server,
        mut recognition,
        ..
    } = config;

    let api_key = recognition
        .api_key
        .take()
        .context("API key missing after validation")?;

    let client = GeminiClient::new(&recognition, api_key)
        .context("Failed to build recognition client")?;
    let recognizer = ModelFallback::from_names(Arc::new(client), &recognition.models);
    let state = AppState::new(recognizer, recognition.prompt.as_str());

    let app = build_router(state, &server);

    info!("Handwriting Recognition OCR Server");
    info!(models = ?recognition.models, "Candidate models loaded");
    info!(static_dir = %server.static_dir.display(), "Serving front end");

    let addr = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Starting server on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
