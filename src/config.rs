//! Process-level configuration for the resizer.
//!
//! Per-request knobs (size, quality, output mode) live on
//! [`crate::request::ResizeRequest`]. [`ResizerConfig`] holds what stays the
//! same across requests: where managed directories are, and which filter the
//! fine-scale step uses. It is cheap to clone and `Send + Sync`, so one value
//! can be shared by every concurrent request.

use crate::error::ResizeError;
use crate::storage::{AppDirs, PathProvider};
use image::imageops::FilterType;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration shared by resize requests.
///
/// Built via [`ResizerConfig::builder()`] or using
/// [`ResizerConfig::default()`].
///
/// # Example
/// ```rust
/// use image_resizer::ResizerConfig;
/// use image::imageops::FilterType;
///
/// let config = ResizerConfig::builder()
///     .storage_root("/var/cache/my-app")
///     .filter(FilterType::CatmullRom)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ResizerConfig {
    /// Supplies the cache directory and app-private named directories.
    /// Default: [`AppDirs`] rooted in the system temp directory.
    pub path_provider: Arc<dyn PathProvider>,

    /// Resampling filter for the final scale step. Default: `Lanczos3`.
    ///
    /// Both decode paths converge on this filter. `Nearest` is rejected by
    /// [`ResizerConfigBuilder::build`].
    pub filter: FilterType,
}

impl Default for ResizerConfig {
    fn default() -> Self {
        Self {
            path_provider: Arc::new(AppDirs::default()),
            filter: FilterType::Lanczos3,
        }
    }
}

impl fmt::Debug for ResizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizerConfig")
            .field("path_provider", &"<dyn PathProvider>")
            .field("cache_dir", &self.path_provider.cache_dir())
            .field("filter", &self.filter)
            .finish()
    }
}

impl ResizerConfig {
    /// Create a new builder for `ResizerConfig`.
    pub fn builder() -> ResizerConfigBuilder {
        ResizerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ResizerConfig`].
pub struct ResizerConfigBuilder {
    config: ResizerConfig,
}

impl fmt::Debug for ResizerConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizerConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ResizerConfigBuilder {
    pub fn path_provider(mut self, provider: Arc<dyn PathProvider>) -> Self {
        self.config.path_provider = provider;
        self
    }

    /// Shorthand for `path_provider(Arc::new(AppDirs::new(root)))`.
    pub fn storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.path_provider = Arc::new(AppDirs::new(root));
        self
    }

    pub fn filter(mut self, filter: FilterType) -> Self {
        self.config.filter = filter;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ResizerConfig, ResizeError> {
        if self.config.filter == FilterType::Nearest {
            return Err(ResizeError::InvalidConfig(
                "nearest-neighbour resampling is not allowed for the scale step".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_lanczos() {
        let config = ResizerConfig::default();
        assert_eq!(config.filter, FilterType::Lanczos3);
    }

    #[test]
    fn storage_root_installs_app_dirs() {
        let config = ResizerConfig::builder()
            .storage_root("/srv/resizer")
            .build()
            .unwrap();
        assert_eq!(
            config.path_provider.cache_dir(),
            PathBuf::from("/srv/resizer/cache/upload-dir")
        );
    }

    #[test]
    fn nearest_filter_rejected() {
        let err = ResizerConfig::builder()
            .filter(FilterType::Nearest)
            .build()
            .unwrap_err();
        assert!(matches!(err, ResizeError::InvalidConfig(_)));
    }

    #[test]
    fn debug_hides_provider() {
        let s = format!("{:?}", ResizerConfig::default());
        assert!(s.contains("<dyn PathProvider>"));
        assert!(s.contains("Lanczos3"));
    }
}
