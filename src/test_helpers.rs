//! Fixture builders shared by unit tests.

use crate::pipeline::encode::encode_jpeg;
use crate::pipeline::orientation::embed_orientation;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

/// An untagged JPEG of the given size.
pub(crate) fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_jpeg(&gradient(width, height), 90).expect("fixture JPEG")
}

/// A JPEG carrying the EXIF orientation `code`.
pub(crate) fn tagged_jpeg_bytes(width: u32, height: u32, code: u16) -> Vec<u8> {
    embed_orientation(&jpeg_bytes(width, height), code).expect("fixture EXIF")
}

/// A PNG of the given size.
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut out, ImageFormat::Png)
        .expect("fixture PNG");
    out.into_inner()
}

/// Write `bytes` to `dir/name` and return the path.
pub(crate) fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("fixture write");
    path
}
