//! Render and asset-provider settings
//!
//! All tunables live here so they are resolved once at startup and passed
//! explicitly. Every field has a default, so a settings file only needs the
//! values it changes.

use crate::effects::frame_count;
use crate::{Codec, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How combined pan + zoom is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanZoomMode {
    /// Zoom for the first half, then pan across the last zoomed frame.
    /// The zoom ramp uses the full duration as its denominator, so it stops
    /// around 1.25x. Kept for output compatibility.
    #[default]
    Split,
    /// Zoom and pan at the same time over the whole duration
    Smooth,
}

/// Which listing tags get their images downloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagFilter {
    /// Every tag with an image
    None,
    /// Only tags whose context is "feature"
    #[default]
    FeatureOnly,
}

impl TagFilter {
    pub fn accepts(&self, context: &str) -> bool {
        match self {
            TagFilter::None => true,
            TagFilter::FeatureOnly => context == "feature",
        }
    }
}

/// Caption placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionStrategyKind {
    /// Caption becomes its own slide right after the image it describes
    #[default]
    SeparateSlide,
    /// Caption is drawn onto the image it describes
    Overlay,
}

/// Slideshow rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Pan non-feature slides horizontally
    pub pan: bool,
    /// Zoom into non-feature slides
    pub zoom: bool,
    /// Seconds each slide is shown
    pub duration_per_image: f64,
    /// Seconds of cross-fade between two normal slides
    pub fade_duration: f64,
    /// Seconds of cross-fade into or out of a feature slide
    pub feature_fade_duration: f64,
    /// Output frame rate
    pub fps: u32,
    /// Canvas that pan strips are padded onto
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub pan_zoom: PanZoomMode,
    pub codec: Codec,
    /// File-name substring marking a feature slide
    pub title_marker: String,
    /// Image file extensions picked up from a directory, lowercase
    pub extensions: Vec<String>,
    /// Explicit ffmpeg executable
    pub ffmpeg_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pan: false,
            zoom: false,
            duration_per_image: 2.0,
            fade_duration: 0.6,
            feature_fade_duration: 2.0,
            fps: 30,
            canvas_width: 1920,
            canvas_height: 1080,
            pan_zoom: PanZoomMode::default(),
            codec: Codec::default(),
            title_marker: "title".to_string(),
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            ffmpeg_path: None,
        }
    }
}

impl RenderConfig {
    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(Error::config("fps must be non-zero"));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(Error::config("canvas width/height must be non-zero"));
        }
        if self.extensions.is_empty() {
            return Err(Error::config("at least one image extension is required"));
        }

        for (name, seconds) in [
            ("duration_per_image", self.duration_per_image),
            ("fade_duration", self.fade_duration),
            ("feature_fade_duration", self.feature_fade_duration),
        ] {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(Error::config(format!(
                    "{name} must be a positive number of seconds, got {seconds}"
                )));
            }
            if frame_count(self.fps, seconds) == 0 {
                return Err(Error::config(format!(
                    "{name} of {seconds}s is shorter than one frame at {} fps",
                    self.fps
                )));
            }
        }

        // Split pan+zoom renders each half on its own
        if self.pan && self.zoom && self.pan_zoom == PanZoomMode::Split {
            let half = self.duration_per_image / 2.0;
            if frame_count(self.fps, half) == 0 {
                return Err(Error::config(format!(
                    "half of duration_per_image ({half}s) is shorter than one frame at {} fps",
                    self.fps
                )));
            }
        }

        Ok(())
    }

    /// Whether `path` has one of the configured image extensions
    pub fn is_image_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|known| *known == ext)
            })
            .unwrap_or(false)
    }

    /// Whether `path`'s file name carries the feature marker
    pub fn has_title_marker(&self, path: &Path) -> bool {
        !self.title_marker.is_empty()
            && path
                .file_name()
                .map(|name| name.to_string_lossy().contains(self.title_marker.as_str()))
                .unwrap_or(false)
    }
}

/// Asset download and caption options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub tag_filter: TagFilter,
    pub captions: CaptionStrategyKind,
    /// Font files tried in order; the first one that loads is used
    pub font_paths: Vec<PathBuf>,
    /// Size of a caption slide
    pub caption_width: u32,
    pub caption_height: u32,
    /// Starting font size for caption slides, in pixels
    pub caption_font_size: f32,
    /// How much the font shrinks per attempt until the text fits
    pub font_size_step: f32,
    /// Starting font size for overlay captions, in pixels
    pub overlay_font_size: f32,
    /// Space between overlay text and its backing box
    pub overlay_padding: u32,
    /// Caption used when the listing has no description
    pub default_description: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            tag_filter: TagFilter::default(),
            captions: CaptionStrategyKind::default(),
            font_paths: vec![
                PathBuf::from("Roboto-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/roboto/unhinted/RobotoTTF/Roboto-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/TTF/DejaVuSans-Bold.ttf"),
                PathBuf::from("/Library/Fonts/Arial.ttf"),
                PathBuf::from("C:\\Windows\\Fonts\\arialbd.ttf"),
            ],
            caption_width: 1920,
            caption_height: 1080,
            caption_font_size: 80.0,
            font_size_step: 5.0,
            overlay_font_size: 800.0,
            overlay_padding: 50,
            default_description: "No Description".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.caption_width == 0 || self.caption_height == 0 {
            return Err(Error::config("caption width/height must be non-zero"));
        }
        for (name, value) in [
            ("caption_font_size", self.caption_font_size),
            ("overlay_font_size", self.overlay_font_size),
            ("font_size_step", self.font_size_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::config(format!("{name} must be positive, got {value}")));
            }
        }
        Ok(())
    }
}

/// Everything the command-line tool needs, loadable from one JSON file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub render: RenderConfig,
    pub provider: ProviderConfig,
}

impl Settings {
    /// Load settings from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Validate both sections
    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        self.provider.validate()
    }
}
