//! Common test utilities

#![allow(dead_code)]

use image::{ImageBuffer, Rgb, RgbImage};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Generate a test image with a solid color and a subtle gradient
pub fn generate_test_image(width: u32, height: u32, base_color: [u8; 3]) -> RgbImage {
    let mut img = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        // Add subtle gradient to make frames distinguishable
        let r = base_color[0].saturating_add((x % 50) as u8);
        let g = base_color[1].saturating_add((y % 50) as u8);
        *pixel = Rgb([r, g, base_color[2]]);
    }

    img
}

/// Generate a numbered test image (useful for slideshow testing)
pub fn generate_numbered_image(width: u32, height: u32, number: u32) -> RgbImage {
    let colors = [
        [255, 100, 100], // Red-ish
        [100, 255, 100], // Green-ish
        [100, 100, 255], // Blue-ish
        [255, 255, 100], // Yellow-ish
        [255, 100, 255], // Magenta-ish
        [100, 255, 255], // Cyan-ish
    ];

    let color = colors[(number as usize) % colors.len()];
    generate_test_image(width, height, color)
}

/// Save a test image as JPEG
pub fn save_jpeg<P: AsRef<Path>>(img: &RgbImage, path: P, quality: u8) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, quality);
    encoder.encode_image(img).map_err(std::io::Error::other)?;

    Ok(())
}

/// Encode a test image as JPEG bytes
pub fn jpeg_bytes(img: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 90)
        .encode_image(img)
        .unwrap();
    bytes
}

/// Save a test image as PNG
pub fn save_png<P: AsRef<Path>>(img: &RgbImage, path: P) -> std::io::Result<()> {
    img.save(path).map_err(std::io::Error::other)
}

/// Set a file's modification time to `secs` after the epoch
pub fn set_mtime<P: AsRef<Path>>(path: P, secs: u64) -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new().write(true).open(path)?;
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
}

/// Write numbered slides named by `names`, with increasing mtimes.
/// `.png` names are written as PNG, everything else as JPEG.
pub fn write_slides<P: AsRef<Path>>(dir: P, names: &[&str], width: u32, height: u32) {
    for (i, name) in names.iter().enumerate() {
        let path = dir.as_ref().join(name);
        let img = generate_numbered_image(width, height, i as u32);
        if name.ends_with(".png") {
            save_png(&img, &path).unwrap();
        } else {
            save_jpeg(&img, &path, 90).unwrap();
        }
        set_mtime(&path, 1_600_000_000 + i as u64 * 60).unwrap();
    }
}

/// Stream header and frame count of a YUV4MPEG2 file
pub fn read_y4m<P: AsRef<Path>>(path: P) -> (String, usize) {
    let bytes = std::fs::read(path).unwrap();
    let header_end = bytes.iter().position(|&b| b == b'\n').unwrap();
    let header = String::from_utf8(bytes[..header_end].to_vec()).unwrap();

    let mut width = 0usize;
    let mut height = 0usize;
    for field in header.split(' ') {
        if let Some(w) = field.strip_prefix('W') {
            width = w.parse().unwrap();
        } else if let Some(h) = field.strip_prefix('H') {
            height = h.parse().unwrap();
        }
    }

    let frame_len = b"FRAME\n".len() + width * height * 3 / 2;
    let body = bytes.len() - header_end - 1;
    assert_eq!(body % frame_len, 0, "truncated frame");

    (header, body / frame_len)
}

/// Verify that a file exists and has non-zero size
pub fn verify_file_exists_with_size<P: AsRef<Path>>(path: P) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.len() > 0,
        Err(_) => false,
    }
}

/// Parse MP4 header to verify it's a valid MP4 file
pub fn verify_mp4_header<P: AsRef<Path>>(path: P) -> bool {
    use std::io::Read;

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    let mut header = [0u8; 12];
    if file.read_exact(&mut header).is_err() {
        return false;
    }

    // MP4 files have 'ftyp' box at offset 4
    &header[4..8] == b"ftyp"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_test_image() {
        let img = generate_test_image(100, 100, [255, 0, 0]);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 100);
    }

    #[test]
    fn test_save_jpeg() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.jpg");

        let img = generate_test_image(100, 100, [255, 0, 0]);
        save_jpeg(&img, &path, 85).unwrap();

        assert!(verify_file_exists_with_size(&path));
    }

    #[test]
    fn test_set_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.png");
        save_png(&generate_test_image(8, 8, [0, 0, 0]), &path).unwrap();

        set_mtime(&path, 1_000_000).unwrap();
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(modified, SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000));
    }
}
