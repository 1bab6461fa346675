//! Caption rendering
//!
//! Two placements share one interface: a caption can become its own slide
//! ([`SeparateSlide`]) or be drawn onto the image it describes ([`Overlay`]).

use crate::config::{CaptionStrategyKind, ProviderConfig};
use crate::frame::Frame;
use crate::{Error, Result};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tracing::debug;

const BLACK: [u8; 3] = [0, 0, 0];
const WHITE: [u8; 3] = [255, 255, 255];

/// Smallest font size tried when shrinking text to fit
const MIN_FONT_SIZE: f32 = 5.0;

/// What to caption and where
#[derive(Debug, Clone, Copy)]
pub struct CaptionRequest<'a> {
    pub text: &'a str,
    /// Image the caption describes, if it was downloaded
    pub image: Option<&'a Path>,
    /// Where a caption slide should be written
    pub caption_path: &'a Path,
}

/// A way of attaching caption text to the slideshow
pub trait CaptionStrategy {
    fn kind(&self) -> CaptionStrategyKind;

    /// Render the caption. Returns the path of a new slide, or `None` when
    /// the caption was drawn into `request.image`.
    fn caption(&self, request: &CaptionRequest<'_>) -> Result<Option<PathBuf>>;
}

/// Build the configured strategy, loading the first usable font
pub fn strategy_for(config: &ProviderConfig) -> Result<Box<dyn CaptionStrategy>> {
    let painter = TextPainter::load(&config.font_paths)?;

    Ok(match config.captions {
        CaptionStrategyKind::SeparateSlide => Box::new(SeparateSlide::new(painter, config)),
        CaptionStrategyKind::Overlay => Box::new(Overlay::new(painter, config)),
    })
}

/// Tight bounds of laid-out text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBox {
    pub width: u32,
    pub height: u32,
    left: f32,
    top: f32,
}

/// Single-font text rasterizer
pub struct TextPainter {
    font: Font,
}

impl TextPainter {
    /// Load the first font in `candidates` that reads and parses
    pub fn load(candidates: &[PathBuf]) -> Result<Self> {
        for path in candidates {
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            match Self::from_bytes(bytes) {
                Ok(painter) => {
                    debug!(font = %path.display(), "loaded caption font");
                    return Ok(painter);
                }
                Err(err) => debug!(font = %path.display(), error = %err, "unusable font"),
            }
        }

        Err(Error::Caption(format!(
            "no usable font among {} candidate(s)",
            candidates.len()
        )))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| Error::Caption(format!("failed to parse font: {e}")))?;
        Ok(Self { font })
    }

    fn layout(&self, text: &str, size: f32) -> Layout {
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[&self.font], &TextStyle::new(text, size, 0));
        layout
    }

    /// Bounds of `text` at `size` pixels
    pub fn measure(&self, text: &str, size: f32) -> TextBox {
        let layout = self.layout(text, size);

        let mut bounds: Option<(f32, f32, f32, f32)> = None;
        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (left, top) = (glyph.x, glyph.y);
            let (right, bottom) = (glyph.x + glyph.width as f32, glyph.y + glyph.height as f32);
            bounds = Some(match bounds {
                None => (left, top, right, bottom),
                Some((l, t, r, b)) => (l.min(left), t.min(top), r.max(right), b.max(bottom)),
            });
        }

        match bounds {
            Some((left, top, right, bottom)) => TextBox {
                width: (right - left).ceil() as u32,
                height: (bottom - top).ceil() as u32,
                left,
                top,
            },
            None => TextBox {
                width: 0,
                height: 0,
                left: 0.0,
                top: 0.0,
            },
        }
    }

    /// Shrink from `size` by `step` until `text` fits in the given box
    pub fn fit(&self, text: &str, size: f32, step: f32, max_width: u32, max_height: u32) -> (f32, TextBox) {
        let mut size = size;
        loop {
            let bounds = self.measure(text, size);
            let fits = bounds.width <= max_width && bounds.height <= max_height;
            if fits || size - step < MIN_FONT_SIZE {
                return (size, bounds);
            }
            size -= step;
        }
    }

    /// Draw `text` with its bounding box's top-left corner at (`x`, `y`)
    pub fn draw(&self, canvas: &mut RgbImage, x: i64, y: i64, text: &str, size: f32, color: [u8; 3]) {
        let bounds = self.measure(text, size);
        let layout = self.layout(text, size);

        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (_, coverage) = self.font.rasterize_config(glyph.key);
            let origin_x = x + (glyph.x - bounds.left).round() as i64;
            let origin_y = y + (glyph.y - bounds.top).round() as i64;

            for (i, &alpha) in coverage.iter().enumerate() {
                if alpha == 0 {
                    continue;
                }
                let px = origin_x + (i % glyph.width) as i64;
                let py = origin_y + (i / glyph.width) as i64;
                if px < 0 || py < 0 || px >= canvas.width() as i64 || py >= canvas.height() as i64 {
                    continue;
                }

                let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                let a = alpha as f32 / 255.0;
                for (dst, &src) in pixel.0.iter_mut().zip(&color) {
                    *dst = (*dst as f32 * (1.0 - a) + src as f32 * a).round() as u8;
                }
            }
        }
    }
}

/// Caption as a slide of its own: dark text centered on a white canvas
pub struct SeparateSlide {
    painter: TextPainter,
    width: u32,
    height: u32,
    font_size: f32,
    step: f32,
}

impl SeparateSlide {
    pub fn new(painter: TextPainter, config: &ProviderConfig) -> Self {
        Self {
            painter,
            width: config.caption_width,
            height: config.caption_height,
            font_size: config.caption_font_size,
            step: config.font_size_step,
        }
    }

    /// Render the caption slide in memory
    pub fn render(&self, text: &str) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(self.width, self.height, Rgb(WHITE));

        let (size, bounds) = self.painter.fit(text, self.font_size, self.step, self.width, self.height);
        let x = (self.width as i64 - bounds.width as i64) / 2;
        let y = (self.height as i64 - bounds.height as i64) / 2;
        self.painter.draw(&mut canvas, x, y, text, size, BLACK);

        canvas
    }
}

impl CaptionStrategy for SeparateSlide {
    fn kind(&self) -> CaptionStrategyKind {
        CaptionStrategyKind::SeparateSlide
    }

    fn caption(&self, request: &CaptionRequest<'_>) -> Result<Option<PathBuf>> {
        let canvas = self.render(request.text);
        canvas.save(request.caption_path)?;
        Ok(Some(request.caption_path.to_path_buf()))
    }
}

/// Caption drawn onto its image: light text on a dark box, centered
pub struct Overlay {
    painter: TextPainter,
    font_size: f32,
    step: f32,
    padding: u32,
}

impl Overlay {
    pub fn new(painter: TextPainter, config: &ProviderConfig) -> Self {
        Self {
            painter,
            font_size: config.overlay_font_size,
            step: config.font_size_step,
            padding: config.overlay_padding,
        }
    }

    /// Draw the caption onto `canvas`
    pub fn render_onto(&self, canvas: &mut RgbImage, text: &str) {
        let (width, height) = canvas.dimensions();
        let padding = self.padding as i64;

        let max_width = width.saturating_sub(2 * self.padding);
        let max_height = height.saturating_sub(2 * self.padding);
        let (size, bounds) = self.painter.fit(text, self.font_size, self.step, max_width, max_height);

        let (w, h) = (width as i64, height as i64);
        let (tw, th) = (bounds.width as i64, bounds.height as i64);

        fill_rect(
            canvas,
            (w - tw - 2 * padding) / 2,
            (h - th - 2 * padding) / 2,
            (w + tw + 2 * padding) / 2,
            (h + th + 2 * padding) / 2,
            BLACK,
        );
        self.painter.draw(canvas, (w - tw) / 2, (h - th) / 2, text, size, WHITE);
    }
}

impl CaptionStrategy for Overlay {
    fn kind(&self) -> CaptionStrategyKind {
        CaptionStrategyKind::Overlay
    }

    fn caption(&self, request: &CaptionRequest<'_>) -> Result<Option<PathBuf>> {
        let Some(image_path) = request.image else {
            return Err(Error::Caption(format!(
                "no image to draw \"{}\" onto",
                request.text
            )));
        };

        let mut canvas = Frame::open(image_path)?.into_image();
        self.render_onto(&mut canvas, request.text);
        canvas.save(image_path)?;

        Ok(None)
    }
}

/// Fill an inclusive rectangle, clipped to the canvas
fn fill_rect(canvas: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 3]) {
    let max_x = canvas.width() as i64 - 1;
    let max_y = canvas.height() as i64 - 1;

    for y in y0.max(0)..=y1.min(max_y) {
        for x in x0.max(0)..=x1.min(max_x) {
            canvas.put_pixel(x as u32, y as u32, Rgb(color));
        }
    }
}
