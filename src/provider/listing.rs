//! Listing descriptor read from the data file

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A product listing: title, description and ordered images
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<ListingImage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListingImage {
    /// URL of the full-size image
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Annotation on an image, optionally pointing at a secondary image
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub image: Option<TagImage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TagImage {
    #[serde(default)]
    pub large: Option<String>,
}

impl Listing {
    /// Read a listing from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Description text, or `fallback` when missing or blank
    pub fn description_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.description.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => fallback,
        }
    }
}

impl Tag {
    /// URL of the tag's image, if it has one
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(|image| image.large.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "title": "FL70JZX",
        "description": "2020 hatchback, one owner",
        "images": [
            { "large": "https://cdn.example.com/1.jpg",
              "tags": [
                { "title": "Alloy wheels", "context": "feature",
                  "image": { "large": "https://cdn.example.com/wheels.jpg" } },
                { "title": "Scratch", "context": "damage" }
              ] },
            { "large": "https://cdn.example.com/2.jpg" },
            { }
        ]
    }"#;

    #[test]
    fn test_parse_listing() {
        let listing = Listing::from_json(SAMPLE).unwrap();
        assert_eq!(listing.title, "FL70JZX");
        assert_eq!(listing.images.len(), 3);
        assert_eq!(listing.images[0].tags.len(), 2);
        assert_eq!(
            listing.images[0].tags[0].image_url(),
            Some("https://cdn.example.com/wheels.jpg")
        );
        assert_eq!(listing.images[0].tags[1].image_url(), None);
        assert!(listing.images[1].tags.is_empty());
        assert!(listing.images[2].large.is_none());
    }

    #[test]
    fn test_description_fallback() {
        let mut listing = Listing::from_json(SAMPLE).unwrap();
        assert_eq!(listing.description_or("No Description"), "2020 hatchback, one owner");
        listing.description = Some("  ".to_string());
        assert_eq!(listing.description_or("No Description"), "No Description");
        listing.description = None;
        assert_eq!(listing.description_or("No Description"), "No Description");
    }

    #[test]
    fn test_missing_title_is_an_error() {
        assert!(Listing::from_json(r#"{ "images": [] }"#).is_err());
    }
}
