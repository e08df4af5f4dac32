use std::path::PathBuf;
use thiserror::Error;

use crate::ai::TransportErrorKind;
use crate::validation::ValidationReport;

/// The main error type for emojicut operations.
#[derive(Debug, Error)]
pub enum EmojiCutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to decode image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Pixel buffer for {width}x{height} needs {expected} bytes, got {actual}")]
    PixelBufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid AI response: {message}")]
    InvalidJson { message: String },

    #[error("Invalid polygon: {message}")]
    InvalidPolygon { message: String },

    #[error("Degenerate region {width}x{height} (extent must be positive)")]
    DegenerateRegion { width: f64, height: f64 },

    #[error("Vision request failed ({kind:?}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },

    #[error("Background removal failed: {0}")]
    BackgroundRemovalFailed(String),

    #[error("Cannot compress image below {max_size} bytes (smallest encoding was {smallest} bytes)")]
    CompressionFailed { max_size: usize, smallest: usize },

    #[error("Failed to parse config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse region JSON from {path}: {source}")]
    RegionsJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write region JSON to {path}: {source}")]
    RegionsJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl EmojiCutError {
    pub(crate) fn invalid_json(message: impl Into<String>) -> Self {
        EmojiCutError::InvalidJson {
            message: message.into(),
        }
    }
}
