//! Image encoding: `DynamicImage` → JPEG bytes → optional base64 data URI.
//!
//! JPEG is the only output format. It has no alpha channel, so every image
//! is flattened to RGB8 before encoding. The data URI is a single line: the
//! fixed `data:image/jpeg;base64,` prefix followed by standard, padded
//! base64 with no line wrapping.

use crate::error::ResizeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use std::io::Write;
use tracing::debug;

/// Prefix of every data URI this crate produces.
pub const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Encode `image` as JPEG into `writer` at `quality` (0–100).
///
/// The JPEG encoder's floor is 1, so 0 encodes as 1.
pub fn write_jpeg<W: Write>(image: &DynamicImage, quality: u8, writer: W) -> Result<(), ResizeError> {
    let rgb = image.to_rgb8();
    JpegEncoder::new_with_quality(writer, quality.clamp(1, 100))
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| ResizeError::EncodeFailed(e.to_string()))
}

/// Encode `image` as an in-memory JPEG.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ResizeError> {
    let mut buf = Vec::new();
    write_jpeg(image, quality, &mut buf)?;
    Ok(buf)
}

/// Encode `image` as a `data:image/jpeg;base64,…` string.
pub fn encode_data_uri(image: &DynamicImage, quality: u8) -> Result<String, ResizeError> {
    let jpeg = encode_jpeg(image, quality)?;
    let b64 = STANDARD.encode(&jpeg);
    debug!("Encoded JPEG {} bytes → {} bytes base64", jpeg.len(), b64.len());
    Ok(format!("{DATA_URI_PREFIX}{b64}"))
}
