//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Vendor master data configuration.
    pub vendors: VendorConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// Geometric tolerances and matching thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Max vertical offset for a value on the same line as its label.
    pub strict_tolerance: f32,

    /// Max vertical offset for the loose same-line search.
    pub loose_tolerance: f32,

    /// Max vertical distance for values printed below their label.
    pub below_distance: f32,

    /// Below-distance for fields whose values sit directly under the label.
    pub tight_below_distance: f32,

    /// Max horizontal gap between tokens joined into one line value.
    pub line_gap: f32,

    /// Restrict label search to the first page for first-page fields.
    pub first_page_only: bool,

    /// Minimum Jaro-Winkler similarity for fuzzy vendor matches (0.0 - 1.0).
    pub fuzzy_vendor_threshold: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strict_tolerance: 5.0,
            loose_tolerance: 20.0,
            below_distance: 150.0,
            tight_below_distance: 50.0,
            line_gap: 40.0,
            first_page_only: true,
            fuzzy_vendor_threshold: 0.92,
        }
    }
}

/// Where vendor master data comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    /// JSON master data file (vendor names, numbers, identifiers).
    pub master_data: Option<PathBuf>,

    /// Extra identifier substrings mapped to vendor display names.
    pub manual_identifiers: BTreeMap<String, String>,
}

/// Batch processing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of extraction workers (0 = one per CPU).
    pub workers: usize,
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
