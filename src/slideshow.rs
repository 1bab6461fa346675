//! Slideshow video generation

use crate::config::RenderConfig;
use crate::effects::{generate, Effect};
use crate::frame::Frame;
use crate::image_loader::{scan_dir, DecodedSlides, Slide, SlideSource};
use crate::sink::{open_sink, SinkConfig, VideoSink};
use crate::transition::{blend, TransitionKind};
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// What a render produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    /// Frames handed to the sink
    pub frames_written: u64,
    /// Slides that decoded and were rendered
    pub slides_rendered: usize,
    /// Slides skipped because they failed to decode
    pub slides_skipped: usize,
    /// Output frame width
    pub width: u32,
    /// Output frame height
    pub height: u32,
}

/// Render every image in `images_dir` into a video at `output_path`.
///
/// Images are ordered by modification time. Fails with
/// [`Error::EmptyInput`] without creating the output when there is nothing
/// to render.
#[tracing::instrument(skip_all, fields(images_dir = %images_dir.as_ref().display()))]
pub fn render<P: AsRef<Path>, Q: AsRef<Path>>(
    images_dir: P,
    output_path: Q,
    config: &RenderConfig,
) -> Result<RenderSummary> {
    config.validate()?;

    let sources = scan_dir(images_dir.as_ref(), config)?;
    render_slides(&sources, output_path, config)
}

/// Render slides in their `sequence` order into a video at `output_path`.
///
/// The sink is picked from the output extension (see [`open_sink`]).
pub fn render_slides<Q: AsRef<Path>>(
    sources: &[SlideSource],
    output_path: Q,
    config: &RenderConfig,
) -> Result<RenderSummary> {
    let output_path = output_path.as_ref();
    render_slides_with(sources, config, |geometry| {
        open_sink(&SinkConfig {
            path: output_path.to_path_buf(),
            ..geometry.clone()
        })
    })
}

/// Render slides into a sink created by `open`.
///
/// `open` receives the sink geometry (size of the first decodable slide,
/// rounded down to even, plus the configured fps and codec) and is called
/// once, before the first frame. The sink is finished exactly once, also when
/// writing fails part-way.
pub fn render_slides_with<F>(
    sources: &[SlideSource],
    config: &RenderConfig,
    open: F,
) -> Result<RenderSummary>
where
    F: FnOnce(&SinkConfig) -> Result<Box<dyn VideoSink>>,
{
    config.validate()?;

    let mut ordered: Vec<SlideSource> = sources.to_vec();
    ordered.sort_by_key(|source| source.sequence);

    let mut slides = DecodedSlides::new(&ordered);
    let Some(first) = slides.next() else {
        let reason = if ordered.is_empty() {
            "slide list is empty".to_string()
        } else {
            format!("none of {} slide(s) could be decoded", ordered.len())
        };
        return Err(Error::EmptyInput(reason));
    };

    // Ensure dimensions are even (required for 4:2:0 video)
    let width = (first.frame.width() / 2 * 2).max(2);
    let height = (first.frame.height() / 2 * 2).max(2);

    let geometry = SinkConfig {
        path: Default::default(),
        codec: config.codec,
        fps: config.fps,
        width,
        height,
        ffmpeg_path: config.ffmpeg_path.clone(),
    };

    let mut sink = open(&geometry)?;
    info!(width, height, fps = config.fps, slides = ordered.len(), "rendering slideshow");

    let mut writer = FrameWriter {
        sink: sink.as_mut(),
        width,
        height,
    };
    let result = write_slides(first, &mut slides, &mut writer, config);

    let frames_written = sink.frames_written();
    let slides_rendered = settle(result, sink.finish())?;

    let summary = RenderSummary {
        frames_written,
        slides_rendered,
        slides_skipped: slides.skipped(),
        width,
        height,
    };

    if summary.slides_skipped > 0 {
        warn!(skipped = summary.slides_skipped, "some slides could not be decoded");
    }
    info!(
        frames = summary.frames_written,
        slides = summary.slides_rendered,
        "slideshow complete"
    );

    Ok(summary)
}

/// Combine the write result with the sink's close result.
///
/// When both fail, an encoder error from closing wins since it carries the
/// encoder's own diagnostics; the other error is logged.
fn settle(written: Result<usize>, finished: Result<()>) -> Result<usize> {
    match (written, finished) {
        (Ok(slides), Ok(())) => Ok(slides),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), Ok(())) => Err(err),
        (Err(write_err), Err(finish_err @ Error::Ffmpeg(_))) => {
            warn!(error = %write_err, "frame write failed");
            Err(finish_err)
        }
        (Err(write_err), Err(finish_err)) => {
            warn!(error = %finish_err, "closing the sink failed");
            Err(write_err)
        }
    }
}

/// Writes frames to the sink, conforming their size first
struct FrameWriter<'a> {
    sink: &'a mut dyn VideoSink,
    width: u32,
    height: u32,
}

impl FrameWriter<'_> {
    /// Letterbox a slide to the output size
    fn normalize(&self, slide: Slide) -> Slide {
        Slide {
            frame: slide.frame.resize_fit(self.width, self.height),
            ..slide
        }
    }

    /// Write one frame and hand back what was actually written
    fn write(&mut self, frame: Frame) -> Result<Frame> {
        let frame = if frame.dimensions() == (self.width, self.height) {
            frame
        } else {
            frame.pad_centered(self.width, self.height)
        };
        self.sink.write_frame(&frame)?;
        Ok(frame)
    }
}

/// Effect frames for each slide, then a transition into the next one.
/// Returns the number of slides rendered.
fn write_slides(
    first: Slide,
    rest: &mut DecodedSlides<'_>,
    writer: &mut FrameWriter<'_>,
    config: &RenderConfig,
) -> Result<usize> {
    let mut current = writer.normalize(first);
    let mut position = 0usize;

    loop {
        let is_feature = current.is_feature || position == 0;
        let effect = Effect::select(config, is_feature);
        debug!(
            path = %current.path.display(),
            ?effect,
            is_feature,
            "rendering slide"
        );

        let mut last_frame = None;
        for frame in generate(&current.frame, effect, config) {
            last_frame = Some(writer.write(frame)?);
        }
        let last_frame = last_frame.unwrap_or_else(|| current.frame.clone());

        position += 1;
        let Some(next) = rest.next() else {
            break;
        };
        let next = writer.normalize(next);

        let kind = TransitionKind::between(is_feature, next.is_feature);
        for frame in blend(&last_frame, &next.frame, kind, config)? {
            writer.write(frame)?;
        }

        current = next;
    }

    Ok(position)
}
