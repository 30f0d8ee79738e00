//! # image-resizer
//!
//! Resize an image named by a file URI or carried inline as a base64 data
//! URI, and return either a JPEG file or a `data:image/jpeg;base64,` string.
//!
//! ## Pipeline Overview
//!
//! ```text
//! uri
//!  │
//!  ├─ 1. Probe    header-only size (file) or full decode (inline)
//!  ├─ 2. Decode   DCT-reduced JPEG decode at the sample size (file)
//!  ├─ 3. Scale    high-quality resample to the final geometry
//!  ├─ 4. Rotate   EXIF-driven, base64 output with fixRotation only
//!  └─ 5. Encode   data URI, or JPEG file with the source orientation tag
//! ```
//!
//! File sources never materialise a full-resolution bitmap when a smaller
//! output is requested: the JPEG decoder is asked for a 1/2, 1/4 or 1/8
//! scale image first, and only the remainder goes through the resampler.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use image_resizer::{resize_from_args, ResizerConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResizerConfig::builder()
//!         .storage_root("/var/cache/my-app")
//!         .build()?;
//!     let args = [json!({ "uri": "file:///photos/IMG_0001.jpg", "width": 800 })];
//!     let output = resize_from_args(&args, &config).await?;
//!     println!("{}", output.location());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `imgresize` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! image-resizer = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod resize;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ResizerConfig, ResizerConfigBuilder};
pub use error::{ErrorKind, ResizeError};
pub use pipeline::geometry::Dimensions;
pub use pipeline::input::SourceRef;
pub use pipeline::orientation::RotationAngle;
pub use request::{parse_args, OutputMode, ResizeRequest, ResizeRequestBuilder};
pub use resize::{resize, resize_from_args, resize_sync, ResizeOutcome, ResizeOutput};
pub use storage::{AppDirs, PathProvider};
