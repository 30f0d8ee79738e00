//! Per-request options and host argument parsing.
//!
//! A host bridge hands over a list of JSON arguments; exactly one object is
//! expected. [`parse_args`] validates that shape and fills in defaults, so a
//! [`ResizeRequest`] that exists is always well-formed: the pipeline never
//! re-validates it.

use crate::error::ResizeError;
use crate::pipeline::input::SourceRef;
use serde::Deserialize;
use serde_json::Value;

/// Default JPEG quality when the host omits `quality`.
pub const DEFAULT_QUALITY: u8 = 85;

/// Sentinel the host uses for "dimension not specified".
const UNSPECIFIED: f64 = -1.0;

/// What to do with the finished pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Write a JPEG file and return its `file://` location.
    File {
        folder: Option<String>,
        name: Option<String>,
    },
    /// Return a `data:image/jpeg;base64,…` string.
    Base64,
}

impl OutputMode {
    pub fn is_base64(&self) -> bool {
        matches!(self, OutputMode::Base64)
    }
}

/// One resize job. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeRequest {
    pub source: SourceRef,
    /// Requested width; `None` means "follow the source".
    pub width: Option<u32>,
    /// Requested height; `None` means "follow the source".
    pub height: Option<u32>,
    /// JPEG quality, 0–100.
    pub quality: u8,
    /// Ratio-fit scaling for inline sources.
    pub fit: bool,
    /// Rotate pixels upright from EXIF orientation (base64 output only).
    pub fix_rotation: bool,
    pub output: OutputMode,
}

impl ResizeRequest {
    /// Start building a request for `uri`.
    pub fn builder(uri: impl Into<String>) -> ResizeRequestBuilder {
        ResizeRequestBuilder {
            uri: uri.into(),
            width: None,
            height: None,
            quality: DEFAULT_QUALITY,
            fit: false,
            fix_rotation: false,
            base64: false,
            folder: None,
            name: None,
        }
    }

    /// Parse a single host argument object.
    pub fn from_value(value: &Value) -> Result<Self, ResizeError> {
        if !value.is_object() {
            return Err(ResizeError::malformed(format!(
                "argument must be an object, got {}",
                json_type(value)
            )));
        }
        let raw = RawOptions::deserialize(value).map_err(|e| ResizeError::malformed(e.to_string()))?;
        raw.into_request()
    }
}

/// Builder for [`ResizeRequest`].
#[derive(Debug, Clone)]
pub struct ResizeRequestBuilder {
    uri: String,
    width: Option<u32>,
    height: Option<u32>,
    quality: u8,
    fit: bool,
    fix_rotation: bool,
    base64: bool,
    folder: Option<String>,
    name: Option<String>,
}

impl ResizeRequestBuilder {
    /// Target width. `0` means unspecified.
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width).filter(|&w| w > 0);
        self
    }

    /// Target height. `0` means unspecified.
    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height).filter(|&h| h > 0);
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn fit(mut self, fit: bool) -> Self {
        self.fit = fit;
        self
    }

    pub fn fix_rotation(mut self, fix: bool) -> Self {
        self.fix_rotation = fix;
        self
    }

    /// Return a data URI instead of writing a file. Folder and file name
    /// are ignored when set.
    pub fn base64(mut self, base64: bool) -> Self {
        self.base64 = base64;
        self
    }

    /// Destination folder: a path (contains `/`) or an app-private name.
    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn build(self) -> Result<ResizeRequest, ResizeError> {
        if self.uri.is_empty() {
            return Err(ResizeError::malformed("uri must not be empty"));
        }
        if self.quality > 100 {
            return Err(ResizeError::malformed(format!(
                "quality must be within 0..=100, got {}",
                self.quality
            )));
        }
        let output = if self.base64 {
            OutputMode::Base64
        } else {
            OutputMode::File {
                folder: self.folder,
                name: self.name,
            }
        };
        Ok(ResizeRequest {
            source: SourceRef::parse(self.uri),
            width: self.width,
            height: self.height,
            quality: self.quality,
            fit: self.fit,
            fix_rotation: self.fix_rotation,
            output,
        })
    }
}

/// Wire shape of the host argument object.
///
/// Numbers arrive as JSON numbers which may carry a fraction; they are
/// truncated the way a host `getInt` would.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOptions {
    uri: String,
    #[serde(default)]
    folder_name: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default = "default_quality")]
    quality: f64,
    #[serde(default = "unspecified")]
    width: f64,
    #[serde(default = "unspecified")]
    height: f64,
    #[serde(default)]
    base64: bool,
    #[serde(default)]
    fit: bool,
    #[serde(default)]
    fix_rotation: bool,
}

fn default_quality() -> f64 {
    f64::from(DEFAULT_QUALITY)
}

fn unspecified() -> f64 {
    UNSPECIFIED
}

/// `≤ 0` → unspecified; oversized values saturate.
fn dimension(value: f64) -> Option<u32> {
    let v = value.trunc();
    (v >= 1.0).then(|| v.min(f64::from(u32::MAX)) as u32)
}

impl RawOptions {
    fn into_request(self) -> Result<ResizeRequest, ResizeError> {
        let quality = self.quality.trunc();
        if !(0.0..=100.0).contains(&quality) {
            return Err(ResizeError::malformed(format!(
                "quality must be within 0..=100, got {}",
                self.quality
            )));
        }

        let mut builder = ResizeRequest::builder(self.uri)
            .quality(quality as u8)
            .fit(self.fit)
            .fix_rotation(self.fix_rotation)
            .base64(self.base64);
        if let Some(w) = dimension(self.width) {
            builder = builder.width(w);
        }
        if let Some(h) = dimension(self.height) {
            builder = builder.height(h);
        }
        if let Some(folder) = self.folder_name {
            builder = builder.folder(folder);
        }
        if let Some(name) = self.file_name {
            builder = builder.file_name(name);
        }
        builder.build()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate the host argument list and build the request.
///
/// Exactly one argument, an object with at least `uri`, is accepted.
pub fn parse_args(args: &[Value]) -> Result<ResizeRequest, ResizeError> {
    match args {
        [value] => ResizeRequest::from_value(value),
        _ => Err(ResizeError::malformed(format!(
            "expected exactly 1 argument, got {}",
            args.len()
        ))),
    }
}
