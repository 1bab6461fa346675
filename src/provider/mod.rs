//! Asset provider
//!
//! Turns a [`Listing`] into image files on disk: downloads each primary
//! image and the tag images the filter accepts, and adds caption slides. The
//! result is a [`Manifest`] carrying an explicit presentation order, so the
//! renderer does not depend on file timestamps.

pub mod caption;
pub mod fetch;
pub mod listing;

pub use caption::{CaptionRequest, CaptionStrategy};
pub use fetch::{Fetch, HttpFetcher};
pub use listing::Listing;

use crate::config::ProviderConfig;
use crate::image_loader::SlideSource;
use crate::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Role of a file in the slideshow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// A listing image
    Primary,
    /// Secondary image attached to a tag
    TagImage,
    /// Rendered caption slide
    Caption,
}

/// A file written by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub path: PathBuf,
    /// Presentation order, strictly increasing
    pub sequence: u64,
    pub kind: AssetKind,
}

/// Everything the provider wrote, in presentation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub assets: Vec<Asset>,
}

impl Manifest {
    fn push(&mut self, path: PathBuf, kind: AssetKind) {
        let sequence = self.assets.len() as u64;
        debug!(path = %path.display(), sequence, ?kind, "asset ready");
        self.assets.push(Asset {
            path,
            sequence,
            kind,
        });
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Renderer input. The first asset and every caption are feature slides.
    pub fn slides(&self) -> Vec<SlideSource> {
        self.assets
            .iter()
            .enumerate()
            .map(|(index, asset)| SlideSource {
                path: asset.path.clone(),
                sequence: asset.sequence,
                is_feature: index == 0 || asset.kind == AssetKind::Caption,
            })
            .collect()
    }
}

/// Downloads listing assets and produces captions
pub struct AssetProvider<F: Fetch> {
    fetcher: F,
    captions: Option<Box<dyn CaptionStrategy>>,
    config: ProviderConfig,
}

impl<F: Fetch> AssetProvider<F> {
    /// `captions` is `None` when captions are disabled, e.g. no font was found
    pub fn new(fetcher: F, captions: Option<Box<dyn CaptionStrategy>>, config: ProviderConfig) -> Self {
        Self {
            fetcher,
            captions,
            config,
        }
    }

    /// Download and caption everything in `listing` into `dir`.
    ///
    /// Failed downloads and captions are logged and left out of the
    /// manifest. Errors are returned only when `dir` cannot be written.
    #[tracing::instrument(skip_all, fields(title = %listing.title, dir = %dir.display()))]
    pub fn provide(&self, listing: &Listing, dir: &Path) -> Result<Manifest> {
        std::fs::create_dir_all(dir)?;

        let stem = file_stem(&listing.title);
        let mut manifest = Manifest::default();

        for (index, image) in listing.images.iter().enumerate() {
            let number = index + 1;

            let primary = match image.large.as_deref() {
                Some(url) => self.download(url, dir.join(format!("{stem}_{number}_large.jpg")))?,
                None => None,
            };
            if let Some(path) = &primary {
                manifest.push(path.clone(), AssetKind::Primary);
            }

            if index == 0 {
                let text = listing.description_or(&self.config.default_description);
                self.add_caption(
                    &mut manifest,
                    text,
                    primary.as_deref(),
                    &dir.join(format!("{stem}_description_title.jpg")),
                );
            }

            for (tag_index, tag) in image.tags.iter().enumerate() {
                if !self.config.tag_filter.accepts(&tag.context) {
                    debug!(tag = %tag.title, context = %tag.context, "tag filtered out");
                    continue;
                }
                let Some(url) = tag.image_url() else {
                    debug!(tag = %tag.title, "tag has no image");
                    continue;
                };

                let tag_number = tag_index + 1;
                let tag_path = dir.join(format!("{stem}_{number}_tag_{tag_number}_large.jpg"));
                let Some(tag_path) = self.download(url, tag_path)? else {
                    continue;
                };
                manifest.push(tag_path.clone(), AssetKind::TagImage);

                self.add_caption(
                    &mut manifest,
                    &tag.title,
                    Some(&tag_path),
                    &dir.join(format!("{stem}_{number}_tag_{tag_number}_title.jpg")),
                );
            }
        }

        info!(assets = manifest.len(), "assets ready");
        Ok(manifest)
    }

    /// Fetch `url` into `path`. A failed fetch is logged and yields `None`.
    fn download(&self, url: &str, path: PathBuf) -> Result<Option<PathBuf>> {
        match self.fetcher.fetch(url) {
            Ok(bytes) => {
                std::fs::write(&path, bytes)?;
                Ok(Some(path))
            }
            Err(err) => {
                warn!(url, error = %err, "download failed");
                Ok(None)
            }
        }
    }

    fn add_caption(&self, manifest: &mut Manifest, text: &str, image: Option<&Path>, caption_path: &Path) {
        let Some(strategy) = self.captions.as_deref() else {
            return;
        };
        if text.trim().is_empty() {
            debug!(path = %caption_path.display(), "empty caption text");
            return;
        }

        let request = CaptionRequest {
            text,
            image,
            caption_path,
        };
        match strategy.caption(&request) {
            Ok(Some(path)) => manifest.push(path, AssetKind::Caption),
            Ok(None) => debug!(text, "caption drawn onto image"),
            Err(err) => warn!(text, error = %err, "caption skipped"),
        }
    }
}

/// File-name-safe version of a listing title
pub fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        "listing".to_string()
    } else {
        stem
    }
}
