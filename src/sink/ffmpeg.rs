//! Container output using an ffmpeg external process

use super::{SinkConfig, VideoSink};
use crate::frame::Frame;
use crate::{Error, Result};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use tracing::debug;

/// Pipes raw RGB frames into ffmpeg, which encodes and muxes them
pub struct FfmpegSink {
    process: Option<Child>,
    stdin: Option<ChildStdin>,
    config: SinkConfig,
    frame_count: u64,
}

impl FfmpegSink {
    pub fn new(config: SinkConfig) -> Result<Self> {
        let ffmpeg = find_ffmpeg(config.ffmpeg_path.as_deref())?;

        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut process = Command::new(&ffmpeg)
            .args([
                "-y",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{}x{}", config.width, config.height),
                "-r",
                &config.fps.to_string(),
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                config.codec.ffmpeg_encoder(),
                "-tag:v",
                config.codec.fourcc(),
                "-pix_fmt",
                "yuv420p",
            ])
            .arg(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Ffmpeg(format!("Failed to start ffmpeg: {}", e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::Ffmpeg("FFmpeg stdin not available".to_string()))?;

        debug!(
            ffmpeg = %ffmpeg.display(),
            output = %config.path.display(),
            codec = config.codec.fourcc(),
            "started ffmpeg"
        );

        Ok(Self {
            process: Some(process),
            stdin: Some(stdin),
            config,
            frame_count: 0,
        })
    }
}

impl VideoSink for FfmpegSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.config.check_frame(frame)?;

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::Ffmpeg("FFmpeg stdin already closed".to_string()))?;

        stdin
            .write_all(frame.as_bytes())
            .map_err(|e| Error::Ffmpeg(format!("Failed to write frame: {}", e)))?;

        self.frame_count += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frame_count
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        // Close stdin to signal end of input
        drop(self.stdin.take());

        let mut process = self
            .process
            .take()
            .ok_or_else(|| Error::Ffmpeg("FFmpeg process already finished".to_string()))?;

        let mut stderr = String::new();
        if let Some(ref mut pipe) = process.stderr {
            let _ = pipe.read_to_string(&mut stderr);
        }

        let status = process
            .wait()
            .map_err(|e| Error::Ffmpeg(format!("FFmpeg process error: {}", e)))?;

        if !status.success() {
            return Err(Error::Ffmpeg(format!(
                "ffmpeg exited with {}: {}",
                status,
                stderr.trim()
            )));
        }

        debug!(frames = self.frame_count, "ffmpeg finished");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // Kill the process if it was never finished
        drop(self.stdin.take());
        if let Some(mut process) = self.process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}

/// Find ffmpeg executable
pub fn find_ffmpeg(custom_path: Option<&std::path::Path>) -> Result<PathBuf> {
    if let Some(path) = custom_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::Ffmpeg(format!(
            "FFmpeg not found at: {}",
            path.display()
        )));
    }

    // Try to find ffmpeg in PATH
    let paths = ["ffmpeg", "/usr/bin/ffmpeg", "/usr/local/bin/ffmpeg"];

    for path in paths {
        if Command::new(path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
        {
            return Ok(PathBuf::from(path));
        }
    }

    Err(Error::Ffmpeg("FFmpeg not found in PATH".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_custom_ffmpeg() {
        let result = find_ffmpeg(Some(std::path::Path::new("/nonexistent/bin/ffmpeg")));
        assert!(matches!(result, Err(Error::Ffmpeg(_))));
    }
}
