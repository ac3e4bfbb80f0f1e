//! Handwriting recognition over a remote multimodal model
//!
//! - `service`: the `RecognitionService` trait and its error type
//! - `gemini`: Gemini REST implementation
//! - `fallback`: ordered fallback across candidate models

pub mod config;
pub mod fallback;
pub mod gemini;
pub mod service;

pub use config::{RecognitionConfig, API_KEY_ENV, DEFAULT_PROMPT};
pub use fallback::{ModelCandidate, ModelFallback, Recognition};
pub use gemini::GeminiClient;
pub use service::{ModelInfo, RecognitionError, RecognitionService};
