//! YUV4MPEG2 output
//!
//! Writes an uncompressed 4:2:0 stream that players and ffmpeg read directly,
//! with no external encoder involved.

use super::{SinkConfig, VideoSink};
use crate::frame::Frame;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};

/// Uncompressed Y4M writer
pub struct Y4mSink {
    writer: BufWriter<File>,
    config: SinkConfig,
    frame_count: u64,
    planes: Vec<u8>,
}

impl Y4mSink {
    pub fn new(config: SinkConfig) -> Result<Self> {
        let file = File::create(&config.path).map_err(Error::Io)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(stream_header(&config).as_bytes())?;

        Ok(Self {
            writer,
            planes: Vec::with_capacity(frame_size(config.width, config.height)),
            config,
            frame_count: 0,
        })
    }
}

/// Stream header line, including the trailing newline
pub fn stream_header(config: &SinkConfig) -> String {
    format!(
        "YUV4MPEG2 W{} H{} F{}:1 Ip A1:1 C420jpeg XCOLORRANGE=FULL\n",
        config.width, config.height, config.fps
    )
}

/// Bytes of pixel data in one 4:2:0 frame
pub fn frame_size(width: u32, height: u32) -> usize {
    let (width, height) = (width as usize, height as usize);
    width * height + 2 * width.div_ceil(2) * height.div_ceil(2)
}

/// Convert an RGB frame to planar YUV 4:2:0 (BT.601, full range)
pub fn rgb_to_yuv420(frame: &Frame, out: &mut Vec<u8>) {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let data = frame.as_bytes();

    out.clear();

    // Y plane
    for idx in (0..width * height).map(|i| i * 3) {
        let r = data[idx] as f32;
        let g = data[idx + 1] as f32;
        let b = data[idx + 2] as f32;

        let y_val = (0.299 * r + 0.587 * g + 0.114 * b).round().clamp(0.0, 255.0) as u8;
        out.push(y_val);
    }

    // U and V planes (subsampled 2x2)
    let uv_width = width.div_ceil(2);
    let uv_height = height.div_ceil(2);
    let mut v_plane = Vec::with_capacity(uv_width * uv_height);

    for y in 0..uv_height {
        for x in 0..uv_width {
            // Average 2x2 block
            let mut sums = [0u32; 3];
            let mut count = 0u32;

            for dy in 0..2 {
                for dx in 0..2 {
                    let sx = (x * 2 + dx).min(width - 1);
                    let sy = (y * 2 + dy).min(height - 1);
                    let idx = (sy * width + sx) * 3;
                    for (sum, &value) in sums.iter_mut().zip(&data[idx..idx + 3]) {
                        *sum += value as u32;
                    }
                    count += 1;
                }
            }

            let r = sums[0] as f32 / count as f32;
            let g = sums[1] as f32 / count as f32;
            let b = sums[2] as f32 / count as f32;

            let u = ((-0.169 * r - 0.331 * g + 0.500 * b) + 128.0).round().clamp(0.0, 255.0) as u8;
            let v = ((0.500 * r - 0.419 * g - 0.081 * b) + 128.0).round().clamp(0.0, 255.0) as u8;

            out.push(u);
            v_plane.push(v);
        }
    }

    out.extend_from_slice(&v_plane);
}

impl VideoSink for Y4mSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.config.check_frame(frame)?;

        rgb_to_yuv420(frame, &mut self.planes);
        self.writer.write_all(b"FRAME\n")?;
        self.writer.write_all(&self.planes)?;

        self.frame_count += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frame_count
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
