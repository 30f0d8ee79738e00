//! File output: destination resolution, atomic JPEG write, orientation copy.
//!
//! The base64 output path lives in [`super::encode`]; this module only
//! handles results that land on disk.

use super::encode::encode_jpeg;
use super::orientation::{embed_orientation, orientation_from_path};
use crate::error::ResizeError;
use crate::storage::PathProvider;
use image::DynamicImage;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const FILE_SCHEME: &str = "file://";
const JPEG_EXTENSION: &str = "jpg";

/// Where a resized file will be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub folder: PathBuf,
    pub file_name: String,
}

impl Destination {
    /// Resolve the caller's optional folder and file name.
    ///
    /// * no folder → the provider's cache directory
    /// * a folder containing `/` → that path, minus any `file://` scheme
    /// * any other folder → the provider's private directory of that name
    ///
    /// Empty strings count as absent. A missing file name becomes
    /// `<unix millis>.jpg`.
    pub fn resolve(
        provider: &dyn PathProvider,
        folder: Option<&str>,
        file_name: Option<&str>,
    ) -> Self {
        let folder = match folder.filter(|f| !f.is_empty()) {
            None => provider.cache_dir(),
            Some(f) if f.contains('/') => PathBuf::from(f.strip_prefix(FILE_SCHEME).unwrap_or(f)),
            Some(name) => provider.private_dir(name),
        };
        let folder = std::path::absolute(&folder).unwrap_or(folder);

        let file_name = file_name
            .filter(|n| !n.is_empty())
            .map_or_else(timestamp_name, str::to_owned);

        Self { folder, file_name }
    }

    pub fn path(&self) -> PathBuf {
        self.folder.join(&self.file_name)
    }
}

fn timestamp_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{millis}.{JPEG_EXTENSION}")
}

/// Write `image` as a JPEG to `dest`, creating the folder if needed.
///
/// When `exif_source` names the original file, its orientation tag is copied
/// onto the output. Pixels are never rotated here. A failed copy is logged
/// and the file is written without the tag.
///
/// The bytes go to a temp file in the destination folder which is then
/// renamed over the final path. An existing file is replaced.
pub fn save(
    image: &DynamicImage,
    dest: &Destination,
    quality: u8,
    exif_source: Option<&Path>,
) -> Result<PathBuf, ResizeError> {
    std::fs::create_dir_all(&dest.folder).map_err(|e| ResizeError::FolderCreateFailed {
        path: dest.folder.clone(),
        source: e,
    })?;

    let mut bytes = encode_jpeg(image, quality)?;
    if let Some(source) = exif_source {
        bytes = copy_orientation(source, bytes);
    }

    let path = dest.path();
    let tmp = NamedTempFile::new_in(&dest.folder).map_err(|e| ResizeError::SaveFailed {
        path: path.clone(),
        detail: format!("cannot create temp file: {e}"),
    })?;

    {
        let mut writer = BufWriter::new(tmp.as_file());
        writer
            .write_all(&bytes)
            .and_then(|()| writer.flush())
            .map_err(|e| ResizeError::Io {
                path: tmp.path().to_path_buf(),
                source: e,
            })?;
    }

    tmp.persist(&path).map_err(|e| ResizeError::SaveFailed {
        path: path.clone(),
        detail: e.error.to_string(),
    })?;

    debug!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

/// Copy the source's orientation tag onto freshly encoded JPEG bytes.
fn copy_orientation(source: &Path, jpeg: Vec<u8>) -> Vec<u8> {
    let Some(code) = orientation_from_path(source) else {
        debug!("No EXIF orientation on {}; nothing to copy", source.display());
        return jpeg;
    };

    match embed_orientation(&jpeg, code) {
        Ok(tagged) => {
            debug!("Copied EXIF orientation {} from {}", code, source.display());
            tagged
        }
        Err(e) => {
            warn!("Failed to copy EXIF orientation from {}: {}", source.display(), e);
            jpeg
        }
    }
}

/// Render a saved path as the `file://` location returned to callers.
pub fn file_uri(path: &Path) -> String {
    format!("{FILE_SCHEME}{}", path.display())
}
