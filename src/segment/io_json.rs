//! JSON region documents.
//!
//! A region document records which image size the regions were computed
//! for, which method produced them, and the regions themselves. The CLI
//! writes one from `detect`/`parse-ai` and reads it back for `extract` and
//! `validate`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::{SegmentationMethod, SegmentationRegion};
use crate::error::EmojiCutError;

/// Dimensions of the source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Regions detected on one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionDocument {
    pub image: ImageSize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<SegmentationMethod>,

    pub regions: Vec<SegmentationRegion>,
}

impl RegionDocument {
    pub fn new(width: u32, height: u32, regions: Vec<SegmentationRegion>) -> Self {
        Self {
            image: ImageSize { width, height },
            method: None,
            regions,
        }
    }

    pub fn with_method(mut self, method: SegmentationMethod) -> Self {
        self.method = Some(method);
        self
    }
}

/// Reads a region document from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_regions_json(path: &Path) -> Result<RegionDocument, EmojiCutError> {
    let file = File::open(path).map_err(EmojiCutError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| EmojiCutError::RegionsJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a region document to a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_regions_json(path: &Path, document: &RegionDocument) -> Result<(), EmojiCutError> {
    let file = File::create(path).map_err(EmojiCutError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, document).map_err(|source| {
        EmojiCutError::RegionsJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Parses a region document from a JSON string.
pub fn from_regions_str(json: &str) -> Result<RegionDocument, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses a region document from JSON bytes.
pub fn from_regions_slice(bytes: &[u8]) -> Result<RegionDocument, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Serializes a region document to a pretty JSON string.
pub fn to_regions_string(document: &RegionDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}
