//! The resize pipeline as an explicit state machine.
//!
//! ```text
//! Probing ──▶ Decoding ──▶ Scaling ──┬──▶ Rotating ──▶ Encoding ──▶ Done
//!    │           │            │      └───────────────▶    │
//!    └───────────┴────────────┴───────────────────────────┴──▶ Failed
//! ```
//!
//! Each [`State`] owns exactly the data the next transition needs, so a
//! failed stage has nothing to hand on: [`Pipeline::transition`] returns an
//! error and the run loop replaces the state with `Failed`.
//!
//! The two sources take different routes through the same states:
//!
//! | Stage | File source | Inline source |
//! |---|---|---|
//! | Probing | header probe, contain geometry, sample size | full decode, inline geometry |
//! | Decoding | reduced decode at the sample size | pass-through |
//! | Scaling | fine resample to final size | fine resample to final size |
//!
//! Rotating runs only for base64 output with `fix_rotation`. File output
//! never rotates pixels; it copies the orientation tag in Encoding instead.

use super::decode::{self, Probe};
use super::encode::encode_data_uri;
use super::geometry::{resolve, resolve_inline, Dimensions};
use super::input::{decode_inline, file_path, SourceRef};
use super::orientation::{rotate, rotation_for_bytes, rotation_for_file, RotationAngle};
use super::output::{self, Destination};
use super::sample::sample_size;
use crate::config::ResizerConfig;
use crate::error::ResizeError;
use crate::request::{OutputMode, ResizeRequest};
use crate::resize::{ResizeOutcome, ResizeOutput};
use image::DynamicImage;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Observable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Probing,
    Decoding,
    Scaling,
    Rotating,
    Encoding,
    Done,
    Failed,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Probing => "probing",
            Stage::Decoding => "decoding",
            Stage::Scaling => "scaling",
            Stage::Rotating => "rotating",
            Stage::Encoding => "encoding",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the Decoding stage has to work with.
enum Pending {
    File {
        path: PathBuf,
        probe: Probe,
        target: Dimensions,
        sample: u32,
    },
    Inline {
        image: DynamicImage,
        target: Dimensions,
    },
}

/// Pipeline state, each variant carrying its stage's input.
enum State {
    Probing,
    Decoding(Pending),
    Scaling {
        image: DynamicImage,
        target: Dimensions,
    },
    Rotating {
        image: DynamicImage,
    },
    Encoding {
        image: DynamicImage,
    },
    Done(ResizeOutput),
    Failed(ResizeError),
}

impl State {
    fn stage(&self) -> Stage {
        match self {
            State::Probing => Stage::Probing,
            State::Decoding(_) => Stage::Decoding,
            State::Scaling { .. } => Stage::Scaling,
            State::Rotating { .. } => Stage::Rotating,
            State::Encoding { .. } => Stage::Encoding,
            State::Done(_) => Stage::Done,
            State::Failed(_) => Stage::Failed,
        }
    }
}

/// Where the Rotating stage reads EXIF orientation from.
enum OrientationSource {
    None,
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// One run of the pipeline for one request.
///
/// Holds no state shared with other runs; concurrent requests each build
/// their own.
pub struct Pipeline<'a> {
    request: &'a ResizeRequest,
    config: &'a ResizerConfig,
    orientation: OrientationSource,
}

impl<'a> Pipeline<'a> {
    pub fn new(request: &'a ResizeRequest, config: &'a ResizerConfig) -> Self {
        Self {
            request,
            config,
            orientation: OrientationSource::None,
        }
    }

    /// Drive the pipeline to a terminal state.
    pub fn run(self) -> ResizeOutcome {
        self.run_traced().0
    }

    /// Like [`run`](Self::run), also returning every stage entered, in order.
    pub fn run_traced(mut self) -> (ResizeOutcome, Vec<Stage>) {
        let mut trace = Vec::new();
        let mut state = State::Probing;
        loop {
            let stage = state.stage();
            trace.push(stage);
            debug!(stage = stage.name(), "pipeline transition");

            state = match state {
                State::Done(output) => return (Ok(output), trace),
                State::Failed(err) => {
                    debug!(error = %err, "pipeline failed");
                    return (Err(err), trace);
                }
                other => self.transition(other).unwrap_or_else(State::Failed),
            };
        }
    }

    fn wants_rotation(&self) -> bool {
        self.request.output.is_base64() && self.request.fix_rotation
    }

    /// Advance one non-terminal state.
    fn transition(&mut self, state: State) -> Result<State, ResizeError> {
        match state {
            State::Probing => self.probe().map(State::Decoding),
            State::Decoding(pending) => self.decode(pending),
            State::Scaling { image, target } => {
                let image = decode::scale_to(image, target, self.config.filter);
                debug!("Scaled to {}x{}", image.width(), image.height());
                if self.wants_rotation() {
                    Ok(State::Rotating { image })
                } else {
                    Ok(State::Encoding { image })
                }
            }
            State::Rotating { image } => {
                let angle = match std::mem::replace(&mut self.orientation, OrientationSource::None)
                {
                    OrientationSource::None => RotationAngle::Deg0,
                    OrientationSource::File(path) => rotation_for_file(&path),
                    OrientationSource::Bytes(bytes) => rotation_for_bytes(&bytes),
                };
                debug!("Rotating by {}°", angle.degrees());
                Ok(State::Encoding {
                    image: rotate(image, angle),
                })
            }
            State::Encoding { image } => self.encode(&image).map(State::Done),
            State::Done(_) | State::Failed(_) => Ok(state),
        }
    }

    fn probe(&mut self) -> Result<Pending, ResizeError> {
        let req = self.request;
        match &req.source {
            SourceRef::FileUri(uri) => {
                let path = file_path(uri);
                let probe = decode::probe_file(&path)?;
                let target = resolve(probe.dimensions, req.width, req.height);
                let sample = sample_size(probe.dimensions, target);
                debug!(
                    "Probed {} ({:?}) → target {}, sample 1/{}",
                    probe.dimensions, probe.format, target, sample
                );
                if self.wants_rotation() {
                    self.orientation = OrientationSource::File(path.clone());
                }
                Ok(Pending::File {
                    path,
                    probe,
                    target,
                    sample,
                })
            }
            SourceRef::InlineBase64(uri) => {
                let bytes = decode_inline(uri)?;
                let image = decode::decode_bytes(&bytes)?;
                let native = Dimensions::new(image.width(), image.height());
                let target = resolve_inline(native, req.width, req.height, req.fit);
                debug!("Decoded inline {} → target {}", native, target);
                if self.wants_rotation() {
                    self.orientation = OrientationSource::Bytes(bytes);
                }
                Ok(Pending::Inline { image, target })
            }
        }
    }

    fn decode(&self, pending: Pending) -> Result<State, ResizeError> {
        match pending {
            Pending::File {
                path,
                probe,
                target,
                sample,
            } => {
                let image = decode::decode_file_sampled(&path, probe, target, sample)?;
                Ok(State::Scaling { image, target })
            }
            Pending::Inline { image, target } => Ok(State::Scaling { image, target }),
        }
    }

    fn encode(&self, image: &DynamicImage) -> Result<ResizeOutput, ResizeError> {
        let req = self.request;
        match &req.output {
            OutputMode::Base64 => encode_data_uri(image, req.quality).map(ResizeOutput::DataUri),
            OutputMode::File { folder, name } => {
                let dest = Destination::resolve(
                    self.config.path_provider.as_ref(),
                    folder.as_deref(),
                    name.as_deref(),
                );
                let exif_source = match &req.source {
                    SourceRef::FileUri(uri) => Some(file_path(uri)),
                    SourceRef::InlineBase64(_) => None,
                };
                let path = output::save(image, &dest, req.quality, exif_source.as_deref())?;
                Ok(ResizeOutput::File { path })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pipeline::encode::DATA_URI_PREFIX;
    use crate::pipeline::orientation::ORIENTATION_ROTATE_90;
    use crate::test_helpers::{jpeg_bytes, tagged_jpeg_bytes, write_file};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use tempfile::TempDir;

    fn config(root: &std::path::Path) -> ResizerConfig {
        ResizerConfig::builder().storage_root(root).build().unwrap()
    }

    fn data_uri(bytes: &[u8]) -> String {
        format!("{DATA_URI_PREFIX}{}", STANDARD.encode(bytes))
    }

    fn decode_result(uri: &str) -> DynamicImage {
        let payload = uri.strip_prefix(DATA_URI_PREFIX).expect("data uri prefix");
        image::load_from_memory(&STANDARD.decode(payload).unwrap()).unwrap()
    }

    #[test]
    fn file_to_file_visits_every_stage_but_rotating() {
        let tmp = TempDir::new().unwrap();
        let src = write_file(tmp.path(), "src.jpg", &jpeg_bytes(400, 300));
        let req = ResizeRequest::builder(src.to_string_lossy())
            .width(100)
            .build()
            .unwrap();
        let cfg = config(tmp.path());

        let (outcome, trace) = Pipeline::new(&req, &cfg).run_traced();
        assert_eq!(
            trace,
            vec![
                Stage::Probing,
                Stage::Decoding,
                Stage::Scaling,
                Stage::Encoding,
                Stage::Done
            ]
        );
        let ResizeOutput::File { path } = outcome.unwrap() else {
            panic!("expected file output");
        };
        let img = image::open(path).unwrap();
        assert_eq!((img.width(), img.height()), (100, 75));
    }

    #[test]
    fn base64_with_fix_rotation_enters_rotating() {
        let tmp = TempDir::new().unwrap();
        let src = write_file(tmp.path(), "src.jpg", &jpeg_bytes(64, 32));
        let req = ResizeRequest::builder(format!("file://{}", src.display()))
            .base64(true)
            .fix_rotation(true)
            .build()
            .unwrap();
        let cfg = config(tmp.path());

        let (outcome, trace) = Pipeline::new(&req, &cfg).run_traced();
        assert!(trace.contains(&Stage::Rotating));
        // Untagged source: 0° rotation keeps the shape.
        let ResizeOutput::DataUri(uri) = outcome.unwrap() else {
            panic!("expected data uri");
        };
        let img = decode_result(&uri);
        assert_eq!((img.width(), img.height()), (64, 32));
    }

    #[test]
    fn inline_rotation_swaps_axes() {
        let tmp = TempDir::new().unwrap();
        let uri = data_uri(&tagged_jpeg_bytes(60, 20, ORIENTATION_ROTATE_90));
        let req = ResizeRequest::builder(uri)
            .width(30)
            .height(10)
            .base64(true)
            .fix_rotation(true)
            .build()
            .unwrap();
        let cfg = config(tmp.path());

        let ResizeOutput::DataUri(out) = Pipeline::new(&req, &cfg).run().unwrap() else {
            panic!("expected data uri");
        };
        let img = decode_result(&out);
        // Scaled to 30x10 first, then rotated 90°.
        assert_eq!((img.width(), img.height()), (10, 30));
    }

    #[test]
    fn file_output_never_rotates_pixels() {
        let tmp = TempDir::new().unwrap();
        let src = write_file(
            tmp.path(),
            "tagged.jpg",
            &tagged_jpeg_bytes(60, 20, ORIENTATION_ROTATE_90),
        );
        let req = ResizeRequest::builder(src.to_string_lossy())
            .fix_rotation(true)
            .file_name("out.jpg")
            .build()
            .unwrap();
        let cfg = config(tmp.path());

        let (outcome, trace) = Pipeline::new(&req, &cfg).run_traced();
        assert!(!trace.contains(&Stage::Rotating));
        let ResizeOutput::File { path } = outcome.unwrap() else {
            panic!("expected file output");
        };
        let img = image::open(path).unwrap();
        assert_eq!((img.width(), img.height()), (60, 20));
    }

    #[test]
    fn inline_without_fit_stretches() {
        let tmp = TempDir::new().unwrap();
        let req = ResizeRequest::builder(data_uri(&jpeg_bytes(100, 50)))
            .width(40)
            .height(40)
            .base64(true)
            .build()
            .unwrap();
        let cfg = config(tmp.path());

        let ResizeOutput::DataUri(out) = Pipeline::new(&req, &cfg).run().unwrap() else {
            panic!("expected data uri");
        };
        let img = decode_result(&out);
        assert_eq!((img.width(), img.height()), (40, 40));
    }

    #[test]
    fn corrupt_inline_fails_in_probing() {
        let tmp = TempDir::new().unwrap();
        let req = ResizeRequest::builder("data:image/jpeg;base64,!!!not-base64!!!")
            .base64(true)
            .build()
            .unwrap();
        let cfg = config(tmp.path());

        let (outcome, trace) = Pipeline::new(&req, &cfg).run_traced();
        assert_eq!(trace, vec![Stage::Probing, Stage::Failed]);
        assert_eq!(outcome.unwrap_err().kind(), ErrorKind::DecodeFailure);
    }

    #[test]
    fn missing_file_fails_without_writing() {
        let tmp = TempDir::new().unwrap();
        let req = ResizeRequest::builder("file:///nonexistent/photo.jpg")
            .build()
            .unwrap();
        let cfg = config(tmp.path());

        let err = Pipeline::new(&req, &cfg).run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
        assert!(!cfg.path_provider.cache_dir().exists());
    }

    #[test]
    fn stage_names_and_terminality() {
        assert_eq!(Stage::Rotating.to_string(), "rotating");
        assert!(Stage::Done.is_terminal());
        assert!(Stage::Failed.is_terminal());
        assert!(!Stage::Encoding.is_terminal());
    }
}
