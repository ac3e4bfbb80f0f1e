//! Router construction

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{self, AppState};
use crate::config::ServerConfig;

/// Build the application router
///
/// Static files under `static_dir` are served for any path no API route
/// matches; everything else falls through to a JSON 404.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let static_files = ServeDir::new(&config.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(handlers::not_found.into_service());

    Router::new()
        .route("/api/recognize", post(handlers::recognize))
        .route("/metrics", get(handlers::metrics))
        .fallback_service(static_files)
        // Oversized bodies surface as a JSON rejection in the handler (413)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handlers::handle_panic)),
        )
        .with_state(state)
}
