//! Input resolution: classify the raw `uri` string and load its bytes.
//!
//! A request names its source with a single string. Inline payloads are
//! recognised by the `data:` scheme; everything else is a file reference,
//! with or without a `file://` prefix. The tag decides which decode path the
//! pipeline takes, so it is derived once here and carried as a
//! [`SourceRef`] from then on.

use crate::error::ResizeError;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use std::path::{Path, PathBuf};
use tracing::debug;

const DATA_SCHEME: &str = "data:";
const FILE_SCHEME: &str = "file://";

/// Payload decoder that accepts padded and unpadded input alike.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Where the source image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// A filesystem path or `file://` URI.
    FileUri(String),
    /// A `data:` URI carrying a base64 payload.
    InlineBase64(String),
}

impl SourceRef {
    /// Classify a raw `uri` argument.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if is_inline(&raw) {
            SourceRef::InlineBase64(raw)
        } else {
            SourceRef::FileUri(raw)
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, SourceRef::FileUri(_))
    }

    /// Short label used in logs and error messages.
    pub fn hint(&self) -> &'static str {
        match self {
            SourceRef::FileUri(_) => "file",
            SourceRef::InlineBase64(_) => "inline",
        }
    }

    /// The raw string as supplied by the caller.
    pub fn as_str(&self) -> &str {
        match self {
            SourceRef::FileUri(s) | SourceRef::InlineBase64(s) => s,
        }
    }
}

/// Check if the input string is an inline data URI.
pub fn is_inline(input: &str) -> bool {
    input.starts_with(DATA_SCHEME)
}

/// Turn a file reference into a local path, dropping any `file://` scheme.
pub fn file_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix(FILE_SCHEME).unwrap_or(uri))
}

/// Decode the payload of a `data:` URI.
///
/// The payload is everything after the first comma. Whitespace (line
/// wrapping from some encoders) is ignored and padding is optional.
pub fn decode_inline(uri: &str) -> Result<Vec<u8>, ResizeError> {
    let payload = uri.split_once(',').map_or(uri, |(_, data)| data);
    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    let bytes = LENIENT
        .decode(&compact)
        .map_err(|e| ResizeError::InvalidBase64 {
            detail: e.to_string(),
        })?;

    if bytes.is_empty() {
        return Err(ResizeError::InvalidBase64 {
            detail: "payload is empty".into(),
        });
    }

    debug!("Decoded inline payload → {} bytes", bytes.len());
    Ok(bytes)
}

/// Open the source file, mapping failures to a decode-class error.
pub fn open_file(path: &Path) -> Result<std::fs::File, ResizeError> {
    std::fs::File::open(path).map_err(|e| ResizeError::SourceUnreadable {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}
