//! Pixel acquisition: header probe, reduced-resolution decode, final scale.
//!
//! ## Why two decode functions?
//!
//! File-backed sources are probed first (header only, no pixels) so the
//! pipeline can size the coarse decode before any bitmap exists. JPEG files
//! are then decoded in the DCT domain at 1/2, 1/4 or 1/8 scale through
//! `jpeg-decoder`, so a 24-megapixel photo bound for an 800 px thumbnail is
//! never materialised at full size. Other formats have no reduced decode and
//! fall back to a full decode.
//!
//! Inline sources are decoded once, fully, from memory; their decoded size
//! is treated as the native size.
//!
//! Both paths then meet in [`scale_to`].

use super::geometry::Dimensions;
use super::input::open_file;
use crate::error::ResizeError;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, RgbImage};
use std::io::{BufReader, Cursor};
use std::path::Path;
use tracing::debug;

const FILE_HINT: &str = "file";
const INLINE_HINT: &str = "inline";

fn decode_error(source_hint: &'static str, e: impl std::fmt::Display) -> ResizeError {
    ResizeError::DecodeFailed {
        source_hint,
        detail: e.to_string(),
    }
}

fn ensure_non_empty(
    source_hint: &'static str,
    image: DynamicImage,
) -> Result<DynamicImage, ResizeError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ResizeError::EmptyImage {
            source_hint,
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(image)
}

/// Result of a header-only probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub dimensions: Dimensions,
    pub format: ImageFormat,
}

/// Read the native size of an image file without decoding its pixels.
pub fn probe_file(path: &Path) -> Result<Probe, ResizeError> {
    let file = open_file(path)?;
    let reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(|e| ResizeError::SourceUnreadable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let format = reader
        .format()
        .ok_or_else(|| decode_error(FILE_HINT, "unrecognised image format"))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| decode_error(FILE_HINT, e))?;

    if width == 0 || height == 0 {
        return Err(ResizeError::EmptyImage {
            source_hint: FILE_HINT,
            width,
            height,
        });
    }

    Ok(Probe {
        dimensions: Dimensions::new(width, height),
        format,
    })
}

/// Decode a file at roughly `1/sample` of its native size.
///
/// The result is never smaller than `target` on either edge, so the final
/// scale step only ever shrinks or keeps.
pub fn decode_file_sampled(
    path: &Path,
    probe: Probe,
    target: Dimensions,
    sample: u32,
) -> Result<DynamicImage, ResizeError> {
    if sample > 1 && probe.format == ImageFormat::Jpeg {
        if let Some(image) = decode_jpeg_scaled(path, probe.dimensions, target, sample)? {
            return ensure_non_empty(FILE_HINT, image);
        }
    }
    decode_file_full(path)
}

/// Full-resolution decode of a file.
pub fn decode_file_full(path: &Path) -> Result<DynamicImage, ResizeError> {
    let file = open_file(path)?;
    let image = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(|e| decode_error(FILE_HINT, e))?
        .decode()
        .map_err(|e| decode_error(FILE_HINT, e))?;
    ensure_non_empty(FILE_HINT, image)
}

/// Full-resolution decode of an in-memory payload.
pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage, ResizeError> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_error(INLINE_HINT, e))?
        .decode()
        .map_err(|e| decode_error(INLINE_HINT, e))?;
    ensure_non_empty(INLINE_HINT, image)
}

/// DCT-scaled JPEG decode.
///
/// Returns `Ok(None)` when the stream decodes to a pixel layout we do not
/// convert here (CMYK, 16-bit); the caller then takes the full-decode path,
/// which handles those layouts.
fn decode_jpeg_scaled(
    path: &Path,
    native: Dimensions,
    target: Dimensions,
    sample: u32,
) -> Result<Option<DynamicImage>, ResizeError> {
    let file = open_file(path)?;
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
    decoder
        .read_info()
        .map_err(|e| decode_error(FILE_HINT, e))?;

    // The decoder picks the strongest reduction that stays at or above the
    // request on both edges.
    let request = |native: u32, target: u32| -> u16 {
        native
            .div_ceil(sample)
            .max(target)
            .min(native)
            .min(u32::from(u16::MAX)) as u16
    };
    let (w, h) = decoder
        .scale(
            request(native.width, target.width),
            request(native.height, target.height),
        )
        .map_err(|e| decode_error(FILE_HINT, e))?;

    let pixels = decoder.decode().map_err(|e| decode_error(FILE_HINT, e))?;
    let format = decoder
        .info()
        .map(|info| info.pixel_format)
        .ok_or_else(|| decode_error(FILE_HINT, "JPEG header missing after decode"))?;

    let (w, h) = (u32::from(w), u32::from(h));
    let image = match format {
        jpeg_decoder::PixelFormat::RGB24 => {
            RgbImage::from_raw(w, h, pixels).map(DynamicImage::ImageRgb8)
        }
        jpeg_decoder::PixelFormat::L8 => {
            GrayImage::from_raw(w, h, pixels).map(DynamicImage::ImageLuma8)
        }
        other => {
            debug!("Scaled JPEG decode produced {:?}; using full decode", other);
            return Ok(None);
        }
    };

    let image = image.ok_or_else(|| decode_error(FILE_HINT, "JPEG pixel buffer size mismatch"))?;
    debug!(
        "Sampled JPEG decode (1/{}) {} → {}x{}",
        sample,
        native,
        image.width(),
        image.height()
    );
    Ok(Some(image))
}

/// Resample to exactly `target`. A no-op when the size already matches.
pub fn scale_to(image: DynamicImage, target: Dimensions, filter: FilterType) -> DynamicImage {
    if image.width() == target.width && image.height() == target.height {
        return image;
    }
    image.resize_exact(target.width, target.height, filter)
}
