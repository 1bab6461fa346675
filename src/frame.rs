//! RGB frame buffers and the geometric helpers the effects are built from

use crate::{Error, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use std::path::Path;

/// Resampling filter used for every scale operation
const SCALE_FILTER: FilterType = FilterType::Triangle;

/// Fixed-size 8-bit RGB pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: RgbImage,
}

impl Frame {
    /// Black frame of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbImage::new(width, height),
        }
    }

    /// Frame filled with one color
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self {
            pixels: RgbImage::from_pixel(width, height, Rgb(rgb)),
        }
    }

    /// Decode an image file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let img = ImageReader::open(path)
            .map_err(|e| Error::decode(path, e))?
            .with_guessed_format()
            .map_err(|e| Error::decode(path, e))?
            .decode()
            .map_err(|e| Error::decode(path, e))?;

        Ok(Self::from_dynamic_image(img))
    }

    /// Create from a DynamicImage, dropping any alpha channel
    pub fn from_dynamic_image(img: DynamicImage) -> Self {
        Self {
            pixels: img.to_rgb8(),
        }
    }

    pub fn from_rgb_image(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Raw RGB bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbImage {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels.get_pixel(x, y).0
    }

    /// Copy out a rectangle, clamped to the frame bounds
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Frame {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        Self {
            pixels: imageops::crop_imm(&self.pixels, x, y, width, height).to_image(),
        }
    }

    /// Scale both axes by `factor`, rounding the new size to whole pixels
    pub fn scale(&self, factor: f64) -> Frame {
        let width = ((self.width() as f64 * factor).round() as u32).max(1);
        let height = ((self.height() as f64 * factor).round() as u32).max(1);
        self.resize_exact(width, height)
    }

    /// Resize to exactly the given size, ignoring aspect ratio
    pub fn resize_exact(&self, width: u32, height: u32) -> Frame {
        if self.dimensions() == (width, height) {
            return self.clone();
        }

        Self {
            pixels: imageops::resize(&self.pixels, width, height, SCALE_FILTER),
        }
    }

    /// Resize to fit within the given size while preserving aspect ratio,
    /// filling the remainder with black
    pub fn resize_fit(&self, width: u32, height: u32) -> Frame {
        if self.dimensions() == (width, height) {
            return self.clone();
        }

        let scale_x = width as f64 / self.width() as f64;
        let scale_y = height as f64 / self.height() as f64;
        let scale = scale_x.min(scale_y);

        let new_width = ((self.width() as f64 * scale).round() as u32).clamp(1, width);
        let new_height = ((self.height() as f64 * scale).round() as u32).clamp(1, height);

        self.resize_exact(new_width, new_height)
            .pad_centered(width, height)
    }

    /// Center this frame on a black canvas of the given size.
    ///
    /// Never scales. An axis larger than the canvas is center-cropped.
    pub fn pad_centered(&self, width: u32, height: u32) -> Frame {
        if self.dimensions() == (width, height) {
            return self.clone();
        }

        let mut canvas = RgbImage::new(width, height);

        let visible_width = self.width().min(width);
        let visible_height = self.height().min(height);
        let (src_x, src_y) =
            centered_offset(visible_width, visible_height, self.width(), self.height());
        let (dst_x, dst_y) = centered_offset(visible_width, visible_height, width, height);

        let visible =
            imageops::crop_imm(&self.pixels, src_x, src_y, visible_width, visible_height).to_image();
        imageops::replace(&mut canvas, &visible, dst_x as i64, dst_y as i64);

        Self { pixels: canvas }
    }

    /// Encode to a file; format follows the extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.pixels.save(path.as_ref())?;
        Ok(())
    }
}

/// Top-left offset that centers an `inner` rectangle inside an `outer` one.
/// Leftover odd pixels go to the right/bottom margin.
pub fn centered_offset(inner_width: u32, inner_height: u32, outer_width: u32, outer_height: u32) -> (u32, u32) {
    (
        outer_width.saturating_sub(inner_width) / 2,
        outer_height.saturating_sub(inner_height) / 2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        Frame::from_rgb_image(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn test_pad_preserves_content() {
        let src = gradient(37, 21);
        let padded = src.pad_centered(1920, 1080);
        assert_eq!(padded.dimensions(), (1920, 1080));

        let (x, y) = centered_offset(37, 21, 1920, 1080);
        assert_eq!((x, y), (941, 529));
        assert_eq!(padded.crop(x, y, 37, 21), src);

        // Margins are black
        assert_eq!(padded.pixel(0, 0), [0, 0, 0]);
        assert_eq!(padded.pixel(1919, 1079), [0, 0, 0]);
    }

    #[test]
    fn test_pad_crops_oversized_axis() {
        let src = gradient(40, 10);
        let padded = src.pad_centered(20, 30);
        assert_eq!(padded.dimensions(), (20, 30));
        // Columns 10..30 of the source, placed at rows 10..20
        assert_eq!(padded.pixel(0, 10), src.pixel(10, 0));
        assert_eq!(padded.pixel(19, 19), src.pixel(29, 9));
        assert_eq!(padded.pixel(5, 5), [0, 0, 0]);
    }

    #[test]
    fn test_crop_is_clamped() {
        let src = gradient(10, 10);
        let cropped = src.crop(8, 8, 5, 5);
        assert_eq!(cropped.dimensions(), (2, 2));
        assert_eq!(cropped.pixel(1, 1), src.pixel(9, 9));
    }

    #[test]
    fn test_scale_rounds_dimensions() {
        let src = gradient(101, 51);
        assert_eq!(src.scale(1.0), src);
        assert_eq!(src.scale(1.5).dimensions(), (152, 77));
    }

    #[test]
    fn test_resize_fit_letterboxes() {
        let src = Frame::filled(200, 100, [200, 10, 10]);
        let fitted = src.resize_fit(100, 100);
        assert_eq!(fitted.dimensions(), (100, 100));
        assert_eq!(fitted.pixel(50, 5), [0, 0, 0]);
        let [r, g, b] = fitted.pixel(50, 50);
        assert!(r.abs_diff(200) <= 1 && g.abs_diff(10) <= 1 && b.abs_diff(10) <= 1);
    }
}
