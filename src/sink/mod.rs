//! Video sinks
//!
//! A sink is opened once with a fixed size and frame rate, takes frames in
//! presentation order and is closed exactly once by [`VideoSink::finish`].

pub mod ffmpeg;
pub mod y4m;

use crate::frame::Frame;
use crate::{Codec, Error, Result};
use std::path::{Path, PathBuf};

/// Append-only video output
pub trait VideoSink: Send {
    /// Append one frame
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Number of frames accepted so far
    fn frames_written(&self) -> u64;

    /// Flush and close the output
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Sink configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output file path
    pub path: PathBuf,
    /// Codec tag for container outputs
    pub codec: Codec,
    /// Frame rate (fps)
    pub fps: u32,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Path to ffmpeg executable
    pub ffmpeg_path: Option<PathBuf>,
}

impl SinkConfig {
    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::config("sink width/height must be non-zero"));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(Error::config(format!(
                "sink size {}x{} must be even for 4:2:0 output",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(Error::config("sink fps must be non-zero"));
        }
        Ok(())
    }

    /// Reject frames that do not match the declared size
    pub fn check_frame(&self, frame: &Frame) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(Error::Encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }
}

/// Output format implied by a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Container file encoded by an ffmpeg child process
    Ffmpeg,
    /// Uncompressed YUV4MPEG2 stream
    Y4m,
}

impl SinkKind {
    pub fn for_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("mp4" | "mov" | "mkv" | "avi") => Ok(SinkKind::Ffmpeg),
            Some("y4m") => Ok(SinkKind::Y4m),
            _ => Err(Error::config(format!(
                "unsupported output format: {}",
                path.display()
            ))),
        }
    }
}

/// Open the sink matching the output path's extension
pub fn open_sink(config: &SinkConfig) -> Result<Box<dyn VideoSink>> {
    config.validate()?;

    match SinkKind::for_path(&config.path)? {
        SinkKind::Ffmpeg => Ok(Box::new(ffmpeg::FfmpegSink::new(config.clone())?)),
        SinkKind::Y4m => Ok(Box::new(y4m::Y4mSink::new(config.clone())?)),
    }
}

/// Sink that only counts frames
#[derive(Debug)]
pub struct NullSink {
    config: SinkConfig,
    frames: u64,
}

impl NullSink {
    pub fn new(config: SinkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, frames: 0 })
    }
}

impl VideoSink for NullSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.config.check_frame(frame)?;
        self.frames += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames
    }

    fn finish(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: &str) -> SinkConfig {
        SinkConfig {
            path: PathBuf::from(path),
            codec: Codec::Mpeg4,
            fps: 30,
            width: 64,
            height: 48,
            ffmpeg_path: None,
        }
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(SinkKind::for_path(Path::new("a.mp4")).unwrap(), SinkKind::Ffmpeg);
        assert_eq!(SinkKind::for_path(Path::new("a.MP4")).unwrap(), SinkKind::Ffmpeg);
        assert_eq!(SinkKind::for_path(Path::new("a.y4m")).unwrap(), SinkKind::Y4m);
        assert!(SinkKind::for_path(Path::new("a.gif")).is_err());
        assert!(SinkKind::for_path(Path::new("a")).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(config("a.mp4").validate().is_ok());
        assert!(SinkConfig { width: 63, ..config("a.mp4") }.validate().is_err());
        assert!(SinkConfig { fps: 0, ..config("a.mp4") }.validate().is_err());
        assert!(SinkConfig { height: 0, ..config("a.mp4") }.validate().is_err());
    }

    #[test]
    fn test_null_sink_counts_and_checks_size() {
        let mut sink = NullSink::new(config("unused.mp4")).unwrap();
        sink.write_frame(&Frame::new(64, 48)).unwrap();
        sink.write_frame(&Frame::new(64, 48)).unwrap();
        assert!(sink.write_frame(&Frame::new(48, 64)).is_err());
        assert_eq!(sink.frames_written(), 2);
        Box::new(sink).finish().unwrap();
    }

    #[test]
    fn test_codec_tags() {
        assert_eq!(Codec::Mpeg4.fourcc(), "mp4v");
        assert_eq!(Codec::H264.fourcc(), "avc1");
        assert_eq!(Codec::H264.ffmpeg_encoder(), "libx264");
    }
}
