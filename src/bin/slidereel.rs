//! slidereel command-line tool
//!
//! Downloads a listing's images, adds captions and renders them into an
//! MP4 slideshow.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use slidereel::config::{CaptionStrategyKind, PanZoomMode, TagFilter};
use slidereel::provider::caption::strategy_for;
use slidereel::provider::{AssetProvider, HttpFetcher, Listing};
use slidereel::sink::NullSink;
use slidereel::{render_slides, render_slides_with, Error, ErrorCode, RenderSummary, Settings};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Turn a product listing into a slideshow video
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Listing JSON file
    data_file: PathBuf,

    /// Directory the listing images and captions are written to
    download_dir: PathBuf,

    /// Output video, must end in .mp4
    output: PathBuf,

    /// Seconds each image is shown
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    duration: u32,

    /// Pan across non-feature slides
    #[arg(long)]
    pan: bool,

    /// Zoom into non-feature slides
    #[arg(long)]
    zoom: bool,

    /// Output frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which tag images to download
    #[arg(long, value_enum)]
    tag_filter: Option<TagFilterArg>,

    /// Caption placement
    #[arg(long, value_enum)]
    captions: Option<CaptionsArg>,

    /// Font file for captions, tried before the configured ones
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Zoom and pan together instead of one after the other
    #[arg(long)]
    smooth_pan_zoom: bool,

    /// Render without encoding and report the frame count
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TagFilterArg {
    /// Every tag that has an image
    All,
    /// Only "feature" tags
    Feature,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CaptionsArg {
    /// Caption slide after each image
    Slide,
    /// Caption drawn onto the image
    Overlay,
    /// No captions
    Off,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(message) = check_arguments(&cli) {
        error!("{message}");
        return exit(ErrorCode::Config);
    }

    match run(&cli) {
        Ok(summary) => {
            info!(
                frames = summary.frames_written,
                slides = summary.slides_rendered,
                skipped = summary.slides_skipped,
                width = summary.width,
                height = summary.height,
                "done"
            );
            exit(ErrorCode::Ok)
        }
        Err(err) => match err.downcast_ref::<Error>() {
            Some(inner) if matches!(inner, Error::EmptyInput(_)) => {
                warn!("{inner}, no video written");
                exit(ErrorCode::from(inner))
            }
            Some(inner) => {
                error!("{err:#}");
                exit(ErrorCode::from(inner))
            }
            None => {
                error!("{err:#}");
                exit(ErrorCode::Failed)
            }
        },
    }
}

fn exit(code: ErrorCode) -> ExitCode {
    ExitCode::from(code as u8)
}

/// Argument checks done before any work starts
fn check_arguments(cli: &Cli) -> Result<(), String> {
    if !cli.data_file.is_file() {
        return Err(format!("Data file not found: {}", cli.data_file.display()));
    }
    if !has_mp4_extension(&cli.output) {
        return Err(format!(
            "Output path must end in .mp4: {}",
            cli.output.display()
        ));
    }
    if !cli.download_dir.is_dir() {
        warn!(dir = %cli.download_dir.display(), "download directory missing, creating it");
        std::fs::create_dir_all(&cli.download_dir)
            .map_err(|e| format!("Cannot create {}: {e}", cli.download_dir.display()))?;
    }
    Ok(())
}

fn has_mp4_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("mp4"))
        .unwrap_or(false)
}

/// Settings file, then command-line overrides
fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let render = &mut settings.render;
    render.pan = cli.pan;
    render.zoom = cli.zoom;
    render.duration_per_image = f64::from(cli.duration);
    if let Some(fps) = cli.fps {
        render.fps = fps;
    }
    if cli.smooth_pan_zoom {
        render.pan_zoom = PanZoomMode::Smooth;
    }

    let provider = &mut settings.provider;
    if let Some(filter) = cli.tag_filter {
        provider.tag_filter = match filter {
            TagFilterArg::All => TagFilter::None,
            TagFilterArg::Feature => TagFilter::FeatureOnly,
        };
    }
    match cli.captions {
        Some(CaptionsArg::Slide) => provider.captions = CaptionStrategyKind::SeparateSlide,
        Some(CaptionsArg::Overlay) => provider.captions = CaptionStrategyKind::Overlay,
        Some(CaptionsArg::Off) | None => {}
    }
    if !cli.fonts.is_empty() {
        let mut fonts = cli.fonts.clone();
        fonts.append(&mut provider.font_paths);
        provider.font_paths = fonts;
    }

    settings.validate()?;
    Ok(settings)
}

fn run(cli: &Cli) -> anyhow::Result<RenderSummary> {
    let settings = load_settings(cli)?;

    let listing = Listing::from_path(&cli.data_file)
        .with_context(|| format!("Failed to read listing {}", cli.data_file.display()))?;

    let captions = if matches!(cli.captions, Some(CaptionsArg::Off)) {
        None
    } else {
        match strategy_for(&settings.provider) {
            Ok(strategy) => Some(strategy),
            Err(err) => {
                warn!(error = %err, "captions disabled");
                None
            }
        }
    };

    let provider = AssetProvider::new(HttpFetcher::new()?, captions, settings.provider.clone());
    let manifest = provider.provide(&listing, &cli.download_dir)?;
    let slides = manifest.slides();

    let summary = if cli.dry_run {
        render_slides_with(&slides, &settings.render, |geometry| {
            Ok(Box::new(NullSink::new(geometry.clone())?))
        })?
    } else {
        render_slides(&slides, &cli.output, &settings.render)?
    };

    Ok(summary)
}
