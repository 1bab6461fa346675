//! Cross-dissolve between adjacent slides

use crate::config::RenderConfig;
use crate::effects::frame_count;
use crate::frame::Frame;
use crate::{Error, Result};

/// Kind of fade between two slides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Outgoing slide fades out while the incoming one fades in
    CrossDissolve,
    /// Fade into or out of a feature slide. The incoming slide is the
    /// background and the outgoing slide's weight ramps down. Uses the longer
    /// feature fade duration.
    Feature,
}

impl TransitionKind {
    /// Feature fade if either side is a feature slide
    pub fn between(outgoing_is_feature: bool, incoming_is_feature: bool) -> Self {
        if outgoing_is_feature || incoming_is_feature {
            TransitionKind::Feature
        } else {
            TransitionKind::CrossDissolve
        }
    }

    pub fn duration(&self, config: &RenderConfig) -> f64 {
        match self {
            TransitionKind::CrossDissolve => config.fade_duration,
            TransitionKind::Feature => config.feature_fade_duration,
        }
    }

    pub fn frame_count(&self, config: &RenderConfig) -> usize {
        frame_count(config.fps, self.duration(config))
    }
}

/// Per-channel `a * weight_a + b * weight_b`, rounded and saturated to 8 bits
pub fn add_weighted(a: &Frame, weight_a: f64, b: &Frame, weight_b: f64) -> Result<Frame> {
    if a.dimensions() != b.dimensions() {
        return Err(Error::InvalidFrame(format!(
            "cannot blend {}x{} with {}x{}",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        )));
    }

    let mut out = a.clone().into_image();
    for (dst, &src) in out.iter_mut().zip(b.as_bytes()) {
        let value = *dst as f64 * weight_a + src as f64 * weight_b;
        *dst = value.round().clamp(0.0, 255.0) as u8;
    }

    Ok(Frame::from_rgb_image(out))
}

/// Lazy sequence of blended frames bridging two slides
pub struct Blend<'a> {
    outgoing: &'a Frame,
    incoming: &'a Frame,
    kind: TransitionKind,
    frames: usize,
    index: usize,
}

/// Blend from `outgoing` to `incoming` over the duration `kind` selects.
///
/// Frame `k` of `n` uses `alpha = k / n`, so the first frame is the outgoing
/// slide and the incoming slide is never shown at full weight.
pub fn blend<'a>(
    outgoing: &'a Frame,
    incoming: &'a Frame,
    kind: TransitionKind,
    config: &RenderConfig,
) -> Result<Blend<'a>> {
    if outgoing.dimensions() != incoming.dimensions() {
        return Err(Error::InvalidFrame(format!(
            "transition endpoints differ in size: {:?} vs {:?}",
            outgoing.dimensions(),
            incoming.dimensions()
        )));
    }

    Ok(Blend {
        outgoing,
        incoming,
        kind,
        frames: kind.frame_count(config),
        index: 0,
    })
}

impl Iterator for Blend<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.index >= self.frames {
            return None;
        }
        let alpha = self.index as f64 / self.frames as f64;
        self.index += 1;

        let blended = match self.kind {
            TransitionKind::CrossDissolve => {
                add_weighted(self.outgoing, 1.0 - alpha, self.incoming, alpha)
            }
            TransitionKind::Feature => {
                add_weighted(self.incoming, alpha, self.outgoing, 1.0 - alpha)
            }
        };

        // Endpoint sizes are checked in `blend`
        blended.ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frames - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Blend<'_> {}
