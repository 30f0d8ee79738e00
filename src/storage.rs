//! Destination directory policy.
//!
//! Where a resized file lands when the caller names no folder (or names a
//! bare identifier rather than a path) is a property of the host
//! environment, not of the resize pipeline. [`PathProvider`] is the seam:
//! the pipeline asks it for directories and never consults the environment
//! itself, so tests point it at a `TempDir` and hosts point it at their own
//! cache and data locations.

use std::fmt;
use std::path::{Path, PathBuf};

/// Supplies the two kinds of managed directory the output writer needs.
///
/// Implementations only compute paths; the writer creates them on demand.
pub trait PathProvider: Send + Sync {
    /// Directory for files written without an explicit folder.
    fn cache_dir(&self) -> PathBuf;

    /// App-private directory for a bare folder name such as `"thumbnails"`.
    fn private_dir(&self, name: &str) -> PathBuf;
}

/// Sub-directory of the cache that holds resized files.
pub const UPLOAD_DIR: &str = "upload-dir";

/// Default [`PathProvider`]: everything lives under one root directory.
///
/// ```text
/// <root>/cache/upload-dir/      ← cache_dir()
/// <root>/app_<name>/            ← private_dir(name)
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AppDirs {
    root: PathBuf,
}

impl AppDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for AppDirs {
    /// Rooted at `<system temp>/image-resizer`.
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("image-resizer"))
    }
}

impl fmt::Debug for AppDirs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AppDirs").field(&self.root).finish()
    }
}

impl PathProvider for AppDirs {
    fn cache_dir(&self) -> PathBuf {
        self.root.join("cache").join(UPLOAD_DIR)
    }

    fn private_dir(&self, name: &str) -> PathBuf {
        self.root.join(format!("app_{name}"))
    }
}
