//! Entry points: run one resize request to a single outcome.
//!
//! The pipeline is CPU-bound and does blocking file I/O, so the async entry
//! point moves the whole run onto a `spawn_blocking` worker. Requests share
//! nothing but the filesystem; any number may run at once.

use crate::config::ResizerConfig;
use crate::error::ResizeError;
use crate::pipeline::machine::Pipeline;
use crate::pipeline::output::file_uri;
use crate::request::{parse_args, ResizeRequest};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Successful result of a resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeOutput {
    /// A JPEG written to disk.
    File { path: PathBuf },
    /// A `data:image/jpeg;base64,…` string.
    DataUri(String),
}

impl ResizeOutput {
    /// The string handed back to the host: a `file://` URI or the data URI.
    pub fn location(&self) -> String {
        match self {
            ResizeOutput::File { path } => file_uri(path),
            ResizeOutput::DataUri(uri) => uri.clone(),
        }
    }
}

impl fmt::Display for ResizeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeOutput::File { path } => f.write_str(&file_uri(path)),
            ResizeOutput::DataUri(uri) => f.write_str(uri),
        }
    }
}

/// The single terminal value of a request.
pub type ResizeOutcome = Result<ResizeOutput, ResizeError>;

fn log_outcome(outcome: &ResizeOutcome, start: Instant) {
    let elapsed_ms = start.elapsed().as_millis();
    match outcome {
        Ok(ResizeOutput::File { path }) => {
            info!("Resize complete in {}ms → {}", elapsed_ms, path.display())
        }
        Ok(ResizeOutput::DataUri(uri)) => {
            info!("Resize complete in {}ms → data URI ({} chars)", elapsed_ms, uri.len())
        }
        Err(e) => warn!("Resize failed after {}ms ({:?}): {}", elapsed_ms, e.kind(), e),
    }
}

/// Resize on the calling thread.
pub fn resize_sync(request: &ResizeRequest, config: &ResizerConfig) -> ResizeOutcome {
    let start = Instant::now();
    info!(
        "Starting resize: {} source, base64={}",
        request.source.hint(),
        request.output.is_base64()
    );
    let outcome = Pipeline::new(request, config).run();
    log_outcome(&outcome, start);
    outcome
}

/// Resize on a blocking worker.
///
/// # Example
/// ```rust,no_run
/// use image_resizer::{resize, ResizeRequest, ResizerConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let request = ResizeRequest::builder("file:///photos/IMG_0001.jpg")
///     .width(800)
///     .quality(80)
///     .build()?;
/// let output = resize(request, &ResizerConfig::default()).await?;
/// println!("{}", output.location());
/// # Ok(())
/// # }
/// ```
pub async fn resize(request: ResizeRequest, config: &ResizerConfig) -> ResizeOutcome {
    let config = config.clone();
    tokio::task::spawn_blocking(move || resize_sync(&request, &config))
        .await
        .map_err(|e| ResizeError::WorkerFailed(e.to_string()))?
}

/// Validate host arguments, then [`resize`].
///
/// Malformed arguments are rejected before any worker is spawned.
pub async fn resize_from_args(args: &[Value], config: &ResizerConfig) -> ResizeOutcome {
    let request = parse_args(args)?;
    resize(request, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_location_is_file_uri() {
        let out = ResizeOutput::File {
            path: PathBuf::from("/tmp/cache/1700000000000.jpg"),
        };
        assert_eq!(out.location(), "file:///tmp/cache/1700000000000.jpg");
        assert_eq!(out.to_string(), out.location());
    }

    #[test]
    fn data_uri_location_is_verbatim() {
        let out = ResizeOutput::DataUri("data:image/jpeg;base64,AAAA".into());
        assert_eq!(out.location(), "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn malformed_args_rejected_before_pipeline() {
        let err = tokio_test::block_on(resize_from_args(&[], &ResizerConfig::default()))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MalformedRequest);
    }
}
