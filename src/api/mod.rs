//! HTTP API for handwriting recognition

pub mod handlers;
pub mod models;
pub mod payload;
pub mod routes;

pub use handlers::{recognize, AppState};
pub use models::{ErrorResponse, RecognizeRequest, RecognizeResponse, ResponseStatus};
pub use payload::{decode_image_payload, DecodedImage, ImageError};
pub use routes::build_router;
