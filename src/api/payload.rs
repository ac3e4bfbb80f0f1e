//! Image payload decoding
//!
//! Clients send either raw base64 or a browser data URL
//! (`data:image/png;base64,<data>`). The prefix is stripped, the rest is
//! base64-decoded and the bytes are checked to be a real raster image
//! before anything is sent upstream.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::io::Cursor;

/// Maximum decoded image size (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

const DATA_URL_MARKER: &str = "data:image";

/// Formats the recognition service accepts as inline image data
const UPSTREAM_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::WebP,
];

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Malformed data URL: missing ',' separator")]
    MalformedDataUrl,

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to re-encode image: {0}")]
    EncodeFailed(String),
}

/// A decoded, validated image ready for the recognition service
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Standard base64 of the image bytes, as the upstream API expects
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            bytes: vec![0x89, b'P', b'N', b'G'],
            format: ImageFormat::Png,
            width: 1,
            height: 1,
        }
    }
}

/// Return the base64 part of a payload, dropping a `data:image...,` prefix
///
/// Everything up to and including the first comma is removed.
pub fn strip_data_url(payload: &str) -> Result<&str, ImageError> {
    if !payload.starts_with(DATA_URL_MARKER) {
        return Ok(payload);
    }
    payload
        .split_once(',')
        .map(|(_, data)| data)
        .ok_or(ImageError::MalformedDataUrl)
}

/// Base64-decode a payload, with or without a data URL prefix
pub fn decode_base64_payload(payload: &str) -> Result<Vec<u8>, ImageError> {
    let encoded = strip_data_url(payload)?;

    // Browsers and CLI tools sometimes wrap long base64 lines
    let encoded: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if encoded.is_empty() {
        return Err(ImageError::EmptyData);
    }

    Ok(STANDARD.decode(encoded)?)
}

/// Decode a payload and confirm the bytes form a raster image
///
/// PNG, JPEG and WebP are passed through untouched; any other format is
/// re-encoded as PNG.
pub fn decode_image_payload(payload: &str) -> Result<DecodedImage, ImageError> {
    let bytes = decode_base64_payload(payload)?;

    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    let format = image::guess_format(&bytes).map_err(|_| ImageError::UnsupportedFormat)?;

    let img = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    if UPSTREAM_FORMATS.contains(&format) {
        return Ok(DecodedImage {
            width: img.width(),
            height: img.height(),
            format,
            bytes,
        });
    }

    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png)
        .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;

    Ok(DecodedImage {
        width: img.width(),
        height: img.height(),
        format: ImageFormat::Png,
        bytes: png.into_inner(),
    })
}
