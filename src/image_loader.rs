//! Slide discovery and decoding
//!
//! A directory scan orders images by modification time, the signal the
//! asset download step leaves behind. Callers holding an explicit order (a
//! provider [`Manifest`](crate::provider::Manifest)) build [`SlideSource`]s
//! directly and skip the scan.

use crate::config::RenderConfig;
use crate::frame::Frame;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// An image waiting to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSource {
    /// Path to the image file
    pub path: PathBuf,
    /// Presentation order; lower comes first
    pub sequence: u64,
    /// Rendered without motion and faded with the feature duration
    pub is_feature: bool,
}

/// A decoded slide
#[derive(Debug, Clone)]
pub struct Slide {
    pub frame: Frame,
    pub sequence: u64,
    pub is_feature: bool,
    pub path: PathBuf,
}

impl Slide {
    /// Decode the image behind `source`
    pub fn load(source: &SlideSource) -> Result<Self> {
        let frame = Frame::open(&source.path)?;
        if frame.width() == 0 || frame.height() == 0 {
            return Err(Error::decode(&source.path, "image has no pixels"));
        }

        Ok(Self {
            frame,
            sequence: source.sequence,
            is_feature: source.is_feature,
            path: source.path.clone(),
        })
    }
}

/// List the images in `dir` in presentation order.
///
/// Files are ordered by ascending modification time, ties broken by file
/// name. The first image and any whose name carries the title marker are
/// feature slides. Fails with [`Error::EmptyInput`] when nothing matches.
pub fn scan_dir<P: AsRef<Path>>(dir: P, config: &RenderConfig) -> Result<Vec<SlideSource>> {
    let dir = dir.as_ref();

    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !config.is_image_path(&path) {
            continue;
        }

        // Follow symlinks
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !metadata.is_file() {
            debug!(path = %path.display(), "skipping non-file entry");
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((modified, path));
    }

    if found.is_empty() {
        return Err(Error::EmptyInput(format!(
            "no image files in {}",
            dir.display()
        )));
    }

    found.sort_by(|(a_time, a_path), (b_time, b_path)| {
        a_time
            .cmp(b_time)
            .then_with(|| a_path.file_name().cmp(&b_path.file_name()))
    });

    let sources: Vec<SlideSource> = found
        .into_iter()
        .enumerate()
        .map(|(index, (_, path))| SlideSource {
            is_feature: index == 0 || config.has_title_marker(&path),
            sequence: index as u64,
            path,
        })
        .collect();

    debug!(dir = %dir.display(), count = sources.len(), "scanned slides");
    Ok(sources)
}

/// Iterator over the slides that decode, in order.
///
/// Undecodable files are logged and skipped; the number skipped is kept.
pub struct DecodedSlides<'a> {
    sources: std::slice::Iter<'a, SlideSource>,
    skipped: usize,
}

impl<'a> DecodedSlides<'a> {
    pub fn new(sources: &'a [SlideSource]) -> Self {
        Self {
            sources: sources.iter(),
            skipped: 0,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for DecodedSlides<'_> {
    type Item = Slide;

    fn next(&mut self) -> Option<Slide> {
        for source in self.sources.by_ref() {
            match Slide::load(source) {
                Ok(slide) => return Some(slide),
                Err(err) => {
                    warn!(path = %source.path.display(), error = %err, "skipping slide");
                    self.skipped += 1;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_missing_dir() {
        let result = scan_dir("/nonexistent/slides", &RenderConfig::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_load_nonexistent() {
        let source = SlideSource {
            path: PathBuf::from("/nonexistent/path/image.png"),
            sequence: 0,
            is_feature: false,
        };
        assert!(matches!(Slide::load(&source), Err(Error::Decode { .. })));
    }
}
