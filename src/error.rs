//! Error types for the image-resizer library.
//!
//! Two failure classes exist and only one of them is an error type:
//!
//! * [`ResizeError`] is **fatal**: the request cannot produce a result.
//!   Returned as `Err(ResizeError)` from the top-level `resize*` functions.
//!   Exactly one of these is surfaced per request; no partial result
//!   accompanies it.
//!
//! * Best-effort failures (reading or copying the EXIF orientation tag) are
//!   not represented here at all. They are logged with `tracing::warn!` and
//!   degrade to a safe default: 0° rotation, or an output file without the
//!   copied tag.
//!
//! Hosts that only care about the coarse category call [`ResizeError::kind`].

use std::path::PathBuf;
use thiserror::Error;

/// The coarse failure category reported to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    /// Missing or invalid argument shape, or invalid configuration.
    MalformedRequest,
    /// Source bytes could not be turned into pixels.
    DecodeFailure,
    /// Read/write error against the filesystem or a stream.
    IoFailure,
    /// The destination directory or file could not be created.
    SaveFailure,
}

/// All fatal errors returned by the image-resizer library.
#[derive(Debug, Error)]
pub enum ResizeError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The host passed something other than exactly one argument object,
    /// or a field had the wrong type or range.
    #[error("Malformed resize request: {reason}")]
    MalformedRequest { reason: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The source file could not be opened.
    #[error("Cannot read source '{path}': {detail}")]
    SourceUnreadable { path: PathBuf, detail: String },

    /// The inline payload is not valid base64.
    #[error("Inline image payload is not valid base64: {detail}")]
    InvalidBase64 { detail: String },

    /// The bytes were read but no pixels came out of them.
    #[error("Failed to decode {source_hint} image: {detail}")]
    DecodeFailed {
        source_hint: &'static str,
        detail: String,
    },

    /// The decoder reported an image with a zero-length edge.
    #[error("Decoded {source_hint} image is empty ({width}x{height})")]
    EmptyImage {
        source_hint: &'static str,
        width: u32,
        height: u32,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Writing or flushing the encoded JPEG failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JPEG encoding failed.
    #[error("JPEG encoding failed: {0}")]
    EncodeFailed(String),

    // ── Save errors ───────────────────────────────────────────────────────
    /// The destination folder does not exist and could not be created.
    #[error("Cannot create destination folder '{path}': {source}")]
    FolderCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The finished file could not be moved into place.
    #[error("Failed to save '{path}': {detail}")]
    SaveFailed { path: PathBuf, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// The blocking worker panicked or was aborted.
    #[error("Resize worker failed: {0}")]
    WorkerFailed(String),
}

impl ResizeError {
    /// Map this error onto the category a host reports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResizeError::MalformedRequest { .. } | ResizeError::InvalidConfig(_) => {
                ErrorKind::MalformedRequest
            }
            ResizeError::SourceUnreadable { .. }
            | ResizeError::InvalidBase64 { .. }
            | ResizeError::DecodeFailed { .. }
            | ResizeError::EmptyImage { .. } => ErrorKind::DecodeFailure,
            ResizeError::Io { .. } | ResizeError::EncodeFailed(_) | ResizeError::WorkerFailed(_) => {
                ErrorKind::IoFailure
            }
            ResizeError::FolderCreateFailed { .. } | ResizeError::SaveFailed { .. } => {
                ErrorKind::SaveFailure
            }
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ResizeError::MalformedRequest {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_request_display() {
        let e = ResizeError::malformed("expected 1 argument, got 2");
        let msg = e.to_string();
        assert!(msg.contains("expected 1 argument"), "got: {msg}");
        assert_eq!(e.kind(), ErrorKind::MalformedRequest);
    }

    #[test]
    fn decode_errors_share_a_kind() {
        let errors = [
            ResizeError::SourceUnreadable {
                path: "/missing.jpg".into(),
                detail: "No such file".into(),
            },
            ResizeError::InvalidBase64 {
                detail: "bad byte".into(),
            },
            ResizeError::DecodeFailed {
                source_hint: "inline",
                detail: "unknown format".into(),
            },
            ResizeError::EmptyImage {
                source_hint: "file",
                width: 0,
                height: 10,
            },
        ];
        for e in &errors {
            assert_eq!(e.kind(), ErrorKind::DecodeFailure, "{e}");
        }
    }

    #[test]
    fn folder_create_display_includes_path() {
        let e = ResizeError::FolderCreateFailed {
            path: "/readonly/out".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/readonly/out"));
        assert_eq!(e.kind(), ErrorKind::SaveFailure);
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error as _;
        let e = ResizeError::Io {
            path: "/tmp/x.jpg".into(),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(e.kind(), ErrorKind::IoFailure);
        assert!(e.source().is_some());
    }

    #[test]
    fn invalid_config_is_malformed_request() {
        let e = ResizeError::InvalidConfig("nearest filter".into());
        assert_eq!(e.kind(), ErrorKind::MalformedRequest);
    }
}
