//! Error types for slidereel

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for slidereel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for slidereel operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration or command-line input
    #[error("Configuration error: {0}")]
    Config(String),

    /// Nothing to render
    #[error("No images to render: {0}")]
    EmptyInput(String),

    /// Remote asset could not be fetched
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// A file exists but is not a readable image
    #[error("Failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    /// Frame buffers that cannot be combined
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Caption image could not be produced
    #[error("Caption error: {0}")]
    Caption(String),

    /// Frame could not be handed to the video sink
    #[error("Encoding error: {0}")]
    Encode(String),

    /// FFmpeg process error
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Listing or settings JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Process exit status reported by the command-line tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Success, or nothing to render
    Ok = 0,
    /// Bad arguments or settings
    Config = 1,
    /// Any failure after work has started
    Failed = 2,
}

impl From<&Error> for ErrorCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config(_) | Error::Json(_) => ErrorCode::Config,
            Error::EmptyInput(_) => ErrorCode::Ok,
            Error::Fetch { .. }
            | Error::Decode { .. }
            | Error::InvalidFrame(_)
            | Error::Caption(_)
            | Error::Encode(_)
            | Error::Ffmpeg(_)
            | Error::Io(_)
            | Error::Image(_) => ErrorCode::Failed,
        }
    }
}
