//! Configuration surfaces and YAML loading.
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change:
//!
//! ```yaml
//! split:
//!   tolerance: 40
//!   mergeDistancePercent: 3
//! ai:
//!   enabled: true
//!   timeoutMs: 20000
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EmojiCutError;
use crate::extract::ExtractOptions;

/// Default cap on the encoded image sent to the vision model (4 MiB).
pub const DEFAULT_MAX_IMAGE_SIZE: usize = 4 * 1024 * 1024;

/// Tuning for the classic flat-background splitter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManualSplitConfig {
    /// Color distance (0-255) under which a pixel counts as background.
    pub tolerance: f64,
    /// Minimum box area in px².
    pub min_area: f64,
    /// Minimum length of a box's shorter side in px.
    pub min_size: f64,
    /// Merge gap as a percentage (0-10) of the image's shorter side.
    pub merge_distance_percent: f64,
}

impl Default for ManualSplitConfig {
    fn default() -> Self {
        Self {
            tolerance: 30.0,
            min_area: 100.0,
            min_size: 10.0,
            merge_distance_percent: 2.0,
        }
    }
}

/// Settings for the vision-model segmentation path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiSegmentationConfig {
    pub enabled: bool,
    pub timeout_ms: u64,
    /// Largest encoded upload in bytes.
    pub max_image_size: usize,
    pub use_polygon: bool,
}

impl Default for AiSegmentationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: 30_000,
            max_image_size: DEFAULT_MAX_IMAGE_SIZE,
            use_polygon: false,
        }
    }
}

/// Everything the CLI reads from a config file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub split: ManualSplitConfig,
    pub ai: AiSegmentationConfig,
    pub extract: ExtractOptions,
}

impl EngineConfig {
    /// Reads a YAML config file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, EmojiCutError> {
        let file = File::open(path).map_err(EmojiCutError::Io)?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| {
            EmojiCutError::ConfigParse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Parses YAML from a string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, EmojiCutError> {
        serde_yaml::from_str(yaml).map_err(|source| EmojiCutError::ConfigParse {
            path: Path::new("<string>").to_path_buf(),
            source,
        })
    }
}
