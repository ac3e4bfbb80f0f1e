//! Handwriting recognition server
//!
//! Accepts a base64 image over HTTP, asks a multimodal model to transcribe
//! the handwriting in it, and returns the text. Candidate models are tried
//! in a fixed order until one answers.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod recognition;

pub use config::Config;
pub use error::{AppError, Result};
