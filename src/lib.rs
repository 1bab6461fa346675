//! slidereel - listing-to-slideshow video generation
//!
//! The pipeline has two halves:
//! - [`provider`]: download a listing's images and produce caption slides
//! - [`slideshow`]: compose an ordered set of stills into a video with
//!   pan/zoom effects and cross-fades

pub mod config;
pub mod effects;
pub mod error;
pub mod frame;
pub mod image_loader;
pub mod provider;
pub mod sink;
pub mod transition;

mod slideshow;

pub use config::{RenderConfig, Settings};
pub use error::{Error, ErrorCode, Result};
pub use frame::Frame;
pub use slideshow::{render, render_slides, render_slides_with, RenderSummary};

use serde::{Deserialize, Serialize};

/// Video codec written by the ffmpeg sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// MPEG-4 Part 2, fourcc `mp4v`
    #[default]
    Mpeg4,
    /// H.264, fourcc `avc1`
    H264,
}

impl Codec {
    /// Codec tag stored in the container
    pub fn fourcc(&self) -> &'static str {
        match self {
            Codec::Mpeg4 => "mp4v",
            Codec::H264 => "avc1",
        }
    }

    /// Name of the ffmpeg encoder producing this codec
    pub fn ffmpeg_encoder(&self) -> &'static str {
        match self {
            Codec::Mpeg4 => "mpeg4",
            Codec::H264 => "libx264",
        }
    }
}
