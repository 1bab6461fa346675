//! Per-slide motion effects
//!
//! [`generate`] turns one still into a lazy, finite sequence of frames. Nothing
//! is precomputed: each call to `next` builds exactly one frame, so a slide
//! never holds more than the source and a single seed frame in memory.

use crate::config::{PanZoomMode, RenderConfig};
use crate::frame::Frame;

/// Zoom factor at the first frame of a zoom ramp
pub const ZOOM_START: f64 = 1.0;
/// Zoom factor the ramp heads towards at the end of the duration
pub const ZOOM_END: f64 = 1.5;
/// Width of the panned window as a fraction of the slide width
pub const PAN_WINDOW: f64 = 0.8;
/// In split pan + zoom, the pan stops at `width - width * PAN_SPLIT_LIMIT`
pub const PAN_SPLIT_LIMIT: f64 = 0.9;

/// Number of frames covering `seconds` at `fps`, rounded to the nearest frame
pub fn frame_count(fps: u32, seconds: f64) -> usize {
    let frames = fps as f64 * seconds;
    if frames.is_finite() && frames > 0.0 {
        frames.round() as usize
    } else {
        0
    }
}

/// Motion applied to a single slide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Source repeated unchanged
    Still,
    /// Centered zoom from 1.0x towards 1.5x
    Zoom,
    /// 80%-wide window sliding left to right, padded onto the canvas
    Pan,
    /// Zoom for half the duration, then pan across the zoomed frame
    SplitPanZoom,
    /// Zoom and pan together for the whole duration
    KenBurns,
}

impl Effect {
    /// Pick the effect for a slide. Feature slides never move.
    pub fn select(config: &RenderConfig, is_feature: bool) -> Self {
        if is_feature {
            return Effect::Still;
        }

        match (config.pan, config.zoom) {
            (true, true) => match config.pan_zoom {
                PanZoomMode::Split => Effect::SplitPanZoom,
                PanZoomMode::Smooth => Effect::KenBurns,
            },
            (true, false) => Effect::Pan,
            (false, true) => Effect::Zoom,
            (false, false) => Effect::Still,
        }
    }

    /// Number of frames this effect produces for one slide
    pub fn frame_count(&self, config: &RenderConfig) -> usize {
        match self {
            Effect::SplitPanZoom => 2 * frame_count(config.fps, config.duration_per_image / 2.0),
            _ => frame_count(config.fps, config.duration_per_image),
        }
    }
}

/// Zoom factor for frame `index` of a ramp with `denominator` steps
pub fn zoom_factor(index: usize, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return ZOOM_START;
    }
    ZOOM_START + (ZOOM_END - ZOOM_START) * (index as f64 / denominator)
}

/// Left edge of the pan window for frame `index` of `frames`.
///
/// Moves linearly from 0 towards `travel`, truncated to whole pixels and
/// clamped so the window never passes `max_offset`.
pub fn pan_offset(index: usize, frames: usize, travel: u32, max_offset: u32) -> u32 {
    if frames == 0 {
        return 0;
    }
    let offset = (travel as f64 * (index as f64 / frames as f64)) as u32;
    offset.min(max_offset)
}

/// Width of the pan window for a slide `width` pixels wide
pub fn pan_window_width(width: u32) -> u32 {
    ((width as f64 * PAN_WINDOW) as u32).max(1)
}

/// Scale `source` by `zoom` and cut its center back out at the original size.
pub fn zoom_crop(source: &Frame, zoom: f64) -> Frame {
    let (width, height) = source.dimensions();
    let zoomed = source.scale(zoom);
    if zoomed.dimensions() == (width, height) {
        return zoomed;
    }

    let (zoomed_width, zoomed_height) = zoomed.dimensions();
    let x = (zoomed_width / 2)
        .saturating_sub(width / 2)
        .min(zoomed_width.saturating_sub(width));
    let y = (zoomed_height / 2)
        .saturating_sub(height / 2)
        .min(zoomed_height.saturating_sub(height));

    zoomed.crop(x, y, width, height)
}

/// Lazy frame sequence for one slide
pub struct EffectFrames<'a> {
    source: &'a Frame,
    effect: Effect,
    canvas: (u32, u32),
    /// Frames in the effect, or in each half for the split effect
    frames: usize,
    /// Zoom ramp length for the split effect
    ramp: f64,
    index: usize,
    seed: Option<Frame>,
}

/// Build the frame sequence for `source`.
///
/// Each call starts over; the effect state lives in the returned iterator.
pub fn generate<'a>(source: &'a Frame, effect: Effect, config: &RenderConfig) -> EffectFrames<'a> {
    let frames = match effect {
        Effect::SplitPanZoom => frame_count(config.fps, config.duration_per_image / 2.0),
        _ => frame_count(config.fps, config.duration_per_image),
    };

    EffectFrames {
        source,
        effect,
        canvas: (config.canvas_width, config.canvas_height),
        frames,
        ramp: config.fps as f64 * config.duration_per_image,
        index: 0,
        seed: None,
    }
}

impl EffectFrames<'_> {
    fn total(&self) -> usize {
        match self.effect {
            Effect::SplitPanZoom => self.frames * 2,
            _ => self.frames,
        }
    }

    fn pan_frame(&self, image: &Frame, index: usize, frames: usize, limit: f64) -> Frame {
        let width = image.width();
        let window = pan_window_width(width).min(width);
        let travel = width.saturating_sub((width as f64 * limit) as u32);
        let x = pan_offset(index, frames, travel, width - window);

        image
            .crop(x, 0, window, image.height())
            .pad_centered(self.canvas.0, self.canvas.1)
    }

    fn ken_burns_frame(&self, index: usize) -> Frame {
        let (width, height) = self.source.dimensions();
        let zoomed = self.source.scale(zoom_factor(index, self.frames as f64));
        let (zoomed_width, zoomed_height) = zoomed.dimensions();

        let travel = zoomed_width.saturating_sub(width);
        let x = pan_offset(index, self.frames, travel, travel);
        let y = zoomed_height.saturating_sub(height) / 2;

        zoomed.crop(x, y, width, height)
    }
}

impl Iterator for EffectFrames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.index >= self.total() {
            return None;
        }
        let index = self.index;
        self.index += 1;

        let frame = match self.effect {
            Effect::Still => self.source.clone(),
            Effect::Zoom => zoom_crop(self.source, zoom_factor(index, self.frames as f64)),
            Effect::Pan => self.pan_frame(self.source, index, self.frames, PAN_WINDOW),
            Effect::SplitPanZoom if index < self.frames => {
                zoom_crop(self.source, zoom_factor(index, self.ramp))
            }
            Effect::SplitPanZoom => {
                if self.seed.is_none() {
                    // The pan runs over the last frame of the zoom half
                    let last_zoom = self.frames.saturating_sub(1);
                    self.seed = Some(zoom_crop(self.source, zoom_factor(last_zoom, self.ramp)));
                }
                let seed = self.seed.as_ref()?;
                self.pan_frame(seed, index - self.frames, self.frames, PAN_SPLIT_LIMIT)
            }
            Effect::KenBurns => self.ken_burns_frame(index),
        };

        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EffectFrames<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn config(pan: bool, zoom: bool) -> RenderConfig {
        RenderConfig {
            pan,
            zoom,
            duration_per_image: 1.0,
            fps: 10,
            canvas_width: 120,
            canvas_height: 80,
            ..Default::default()
        }
    }

    /// Each column has a distinct red value; rows differ in green
    fn columns(width: u32, height: u32) -> Frame {
        Frame::from_rgb_image(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 2) as u8, (y * 3) as u8, 90])
        }))
    }

    #[test]
    fn test_frame_count_rounds() {
        assert_eq!(frame_count(30, 2.0), 60);
        assert_eq!(frame_count(30, 0.6), 18);
        assert_eq!(frame_count(60, 0.6), 36);
        assert_eq!(frame_count(30, 0.01), 0);
        assert_eq!(frame_count(30, -1.0), 0);
    }

    #[test]
    fn test_select() {
        assert_eq!(Effect::select(&config(true, true), true), Effect::Still);
        assert_eq!(Effect::select(&config(false, false), false), Effect::Still);
        assert_eq!(Effect::select(&config(true, false), false), Effect::Pan);
        assert_eq!(Effect::select(&config(false, true), false), Effect::Zoom);
        assert_eq!(Effect::select(&config(true, true), false), Effect::SplitPanZoom);

        let smooth = RenderConfig {
            pan_zoom: PanZoomMode::Smooth,
            ..config(true, true)
        };
        assert_eq!(Effect::select(&smooth, false), Effect::KenBurns);
    }

    #[test]
    fn test_still_repeats_source() {
        let source = columns(64, 48);
        let frames: Vec<_> = generate(&source, Effect::Still, &config(false, false)).collect();
        assert_eq!(frames.len(), 10);
        assert!(frames.iter().all(|f| *f == source));
    }

    #[test]
    fn test_zoom_starts_unscaled_and_keeps_center() {
        let source = columns(100, 60);
        let cfg = config(false, true);
        let frames: Vec<_> = generate(&source, Effect::Zoom, &cfg).collect();

        assert_eq!(frames.len(), 10);
        assert_eq!(frames[0], source);
        assert!(frames.iter().all(|f| f.dimensions() == (100, 60)));

        // Last frame is zoom 1.45: the crop narrows around the same center
        let last = frames.last().unwrap();
        let center = source.pixel(50, 30);
        let zoomed_center = last.pixel(50, 30);
        for channel in 0..3 {
            assert!(center[channel].abs_diff(zoomed_center[channel]) <= 4);
        }
        // Edge column now shows content from further inside the source
        assert!(last.pixel(0, 30)[0] > source.pixel(0, 30)[0]);
    }

    #[test]
    fn test_zoom_factor_ramp() {
        assert_eq!(zoom_factor(0, 60.0), 1.0);
        assert!((zoom_factor(59, 60.0) - 1.4917).abs() < 1e-3);
        assert!((zoom_factor(29, 60.0) - 1.2417).abs() < 1e-3);
        assert_eq!(zoom_factor(5, 0.0), 1.0);
    }

    #[test]
    fn test_pan_window_moves_right_within_bounds() {
        let width = 100;
        let window = pan_window_width(width);
        let travel = width - window;

        let offsets: Vec<u32> = (0..10).map(|j| pan_offset(j, 10, travel, travel)).collect();
        assert_eq!(offsets[0], 0);
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        assert!(offsets.iter().all(|x| x + window <= width));
        assert_eq!(pan_offset(10, 10, travel, travel), travel);
        assert_eq!(pan_offset(3, 0, travel, travel), 0);
    }

    #[test]
    fn test_pan_frames_are_padded_strips() {
        let source = columns(100, 60);
        let frames: Vec<_> = generate(&source, Effect::Pan, &config(true, false)).collect();
        assert_eq!(frames.len(), 10);

        for (j, frame) in frames.iter().enumerate() {
            assert_eq!(frame.dimensions(), (120, 80));
            // 80px strip centered in 120px: starts at column 20, row 10
            let x = pan_offset(j, 10, 20, 20);
            assert_eq!(frame.pixel(20, 10), source.pixel(x, 0));
            assert_eq!(frame.pixel(19, 40), [0, 0, 0]);
            assert_eq!(frame.pixel(100, 40), [0, 0, 0]);
        }
    }

    #[test]
    fn test_split_pan_zoom_halves() {
        let source = columns(100, 60);
        let cfg = config(true, true);
        let effect = Effect::select(&cfg, false);
        let frames: Vec<_> = generate(&source, effect, &cfg).collect();

        assert_eq!(effect.frame_count(&cfg), 10);
        assert_eq!(frames.len(), 10);
        assert_eq!(frames[0], source);
        assert!(frames[..5].iter().all(|f| f.dimensions() == (100, 60)));
        assert!(frames[5..].iter().all(|f| f.dimensions() == (120, 80)));

        // The pan runs over the last zoomed frame, not the source
        let seed = zoom_crop(&source, zoom_factor(4, 10.0));
        assert_eq!(frames[5].crop(20, 10, 80, 60), seed.crop(0, 0, 80, 60));

        // Pan stops at width - 0.9 * width
        let travel = 100 - 90;
        let last_offset = pan_offset(4, 5, travel, 20);
        assert_eq!(last_offset, 8);
        assert_eq!(frames[9].crop(20, 10, 80, 60), seed.crop(last_offset, 0, 80, 60));
    }

    #[test]
    fn test_ken_burns_stays_in_frame() {
        let source = columns(100, 60);
        let cfg = RenderConfig {
            pan_zoom: PanZoomMode::Smooth,
            ..config(true, true)
        };
        let frames: Vec<_> = generate(&source, Effect::KenBurns, &cfg).collect();
        assert_eq!(frames.len(), 10);
        assert_eq!(frames[0], source);
        assert!(frames.iter().all(|f| f.dimensions() == (100, 60)));
    }

    #[test]
    fn test_sequences_restart() {
        let source = columns(40, 30);
        let cfg = config(false, true);
        let first: Vec<_> = generate(&source, Effect::Zoom, &cfg).collect();
        let second: Vec<_> = generate(&source, Effect::Zoom, &cfg).collect();
        assert_eq!(first, second);

        let mut frames = generate(&source, Effect::Zoom, &cfg);
        assert_eq!(frames.len(), 10);
        frames.next();
        assert_eq!(frames.len(), 9);
    }
}
