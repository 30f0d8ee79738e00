//! Pipeline stages for image resizing.
//!
//! Each submodule implements one step; [`machine`] sequences them.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ (geometry, sample) ──▶ decode ──▶ orientation ──▶ encode / output
//! (uri)     (probe)     (pure arithmetic)     (pixels)    (optional)      (data URI / file)
//! ```
//!
//! 1. [`input`]       classify the `uri` and load inline payloads
//! 2. [`geometry`]    final output size from source size and request
//! 3. [`sample`]      coarse decode factor for file sources
//! 4. [`decode`]      header probe, reduced decode, fine scale
//! 5. [`orientation`] EXIF tag read, pixel rotation, tag copy
//! 6. [`encode`]      JPEG bytes and data URIs
//! 7. [`output`]      destination resolution and atomic file write

pub mod decode;
pub mod encode;
pub mod geometry;
pub mod input;
pub mod machine;
pub mod orientation;
pub mod output;
pub mod sample;
