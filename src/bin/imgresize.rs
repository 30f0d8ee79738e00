//! CLI binary for image-resizer.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ResizeRequest` and prints the result location on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use image::imageops::FilterType;
use image_resizer::{resize, resize_from_args, ResizeRequest, ResizerConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Shrink to 800 px wide, keep aspect ratio, write to the cache dir
  imgresize --width 800 file:///photos/IMG_0001.jpg

  # Fit inside 500x500, named output in an app-private folder
  imgresize --width 500 --height 500 --folder thumbs --file-name t.jpg photo.jpg

  # Return an upright data URI instead of a file
  imgresize --base64 --fix-rotation --width 320 photo.jpg > thumb.txt

  # Pass a raw host argument object
  imgresize --request '{"uri":"/photos/a.jpg","width":640,"quality":70}'

OUTPUT LOCATIONS:
  no --folder          <storage-root>/cache/upload-dir/<millis>.jpg
  --folder name        <storage-root>/app_name/
  --folder /some/path  /some/path/

ENVIRONMENT VARIABLES:
  RUST_LOG               Overrides the log filter (e.g. image_resizer=debug)
  IMGRESIZE_*            Fallback for every flag (e.g. IMGRESIZE_QUALITY=70)
"#;

/// Resize images from file URIs or inline base64 data URIs.
#[derive(Parser, Debug)]
#[command(
    name = "imgresize",
    version,
    about = "Resize images from file URIs or inline base64 data URIs",
    long_about = "Resize an image named by a file path, file:// URI or data: URI. \
The result is written as a JPEG file (its file:// location is printed) or printed \
as a data:image/jpeg;base64 URI.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source image: a path, file:// URI or data: URI.
    #[arg(required_unless_present = "request")]
    uri: Option<String>,

    /// Target width in pixels.
    #[arg(short = 'W', long, env = "IMGRESIZE_WIDTH")]
    width: Option<u32>,

    /// Target height in pixels.
    #[arg(short = 'H', long, env = "IMGRESIZE_HEIGHT")]
    height: Option<u32>,

    /// JPEG quality (0–100).
    #[arg(short, long, env = "IMGRESIZE_QUALITY", default_value_t = 85,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,

    /// Print a data URI instead of writing a file.
    #[arg(long, env = "IMGRESIZE_BASE64")]
    base64: bool,

    /// Ratio-fit scaling for inline sources.
    #[arg(long, env = "IMGRESIZE_FIT")]
    fit: bool,

    /// Rotate pixels upright from EXIF orientation (with --base64).
    #[arg(long, env = "IMGRESIZE_FIX_ROTATION")]
    fix_rotation: bool,

    /// Destination folder: a path, or a bare name for an app-private folder.
    #[arg(long, env = "IMGRESIZE_FOLDER")]
    folder: Option<String>,

    /// Destination file name. Default: <unix millis>.jpg.
    #[arg(long, env = "IMGRESIZE_FILE_NAME")]
    file_name: Option<String>,

    /// Root for the cache and app-private folders.
    #[arg(long, env = "IMGRESIZE_STORAGE_ROOT")]
    storage_root: Option<PathBuf>,

    /// Resampling filter for the final scale step.
    #[arg(long, env = "IMGRESIZE_FILTER", value_enum, default_value = "lanczos3")]
    filter: FilterArg,

    /// Raw JSON argument object; overrides the individual request flags.
    #[arg(long, env = "IMGRESIZE_REQUEST")]
    request: Option<String>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMGRESIZE_VERBOSE")]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short = 'Q', long, env = "IMGRESIZE_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FilterArg {
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<FilterArg> for FilterType {
    fn from(v: FilterArg) -> Self {
        match v {
            FilterArg::Triangle => FilterType::Triangle,
            FilterArg::CatmullRom => FilterType::CatmullRom,
            FilterArg::Gaussian => FilterType::Gaussian,
            FilterArg::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl Cli {
    fn config(&self) -> Result<ResizerConfig> {
        let mut builder = ResizerConfig::builder().filter(self.filter.into());
        if let Some(root) = &self.storage_root {
            builder = builder.storage_root(root);
        }
        builder.build().context("Invalid resizer configuration")
    }

    fn build_request(&self) -> Result<ResizeRequest> {
        let uri = self
            .uri
            .clone()
            .context("A source URI is required without --request")?;
        let mut builder = ResizeRequest::builder(uri)
            .quality(self.quality)
            .base64(self.base64)
            .fit(self.fit)
            .fix_rotation(self.fix_rotation);
        if let Some(w) = self.width {
            builder = builder.width(w);
        }
        if let Some(h) = self.height {
            builder = builder.height(h);
        }
        if let Some(folder) = &self.folder {
            builder = builder.folder(folder);
        }
        if let Some(name) = &self.file_name {
            builder = builder.file_name(name);
        }
        builder.build().context("Invalid resize request")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.config()?;

    let output = match &cli.request {
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(raw).context("--request is not valid JSON")?;
            resize_from_args(&[value], &config)
                .await
                .context("Resize failed")?
        }
        None => {
            let request = cli.build_request()?;
            resize(request, &config).await.context("Resize failed")?
        }
    };

    println!("{}", output.location());
    Ok(())
}
