//! Locator configuration
//!
//! Every field has a default matching the reading-room installation, so a
//! JSON file only needs the keys it overrides:
//!
//! ```json
//! { "secondary_path": "data/rangos", "projection": { "axis_inversion": [false, false, true] } }
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::TableCache;
use crate::data::{RangeRecordSource, ShelfGridSource, DEFAULT_SHEET};

/// Default boundary tolerance for range inclusion
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Grid-to-world transform parameters, one value per (x, y, z) axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// World distance between neighbouring cells (shelf depth, position, row)
    pub spacing: [f64; 3],
    /// World position of grid cell (1, 1, 1)
    pub origin: [f64; 3],
    pub axis_inversion: [bool; 3],
    /// Physical shelf width used by intra-shelf refinement
    pub shelf_width: f64,
    pub use_intra_shelf_refinement: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            spacing: [1.2, 0.35, 2.0],
            origin: [0.0, 0.0, 0.0],
            axis_inversion: [false, false, false],
            shelf_width: 1.2,
            use_intra_shelf_refinement: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Primary shelf grid CSV
    pub primary_path: PathBuf,
    /// Secondary range records (file, or directory of sheet exports)
    pub secondary_path: Option<PathBuf>,
    pub secondary_sheet: String,
    pub epsilon: f64,
    pub projection: ProjectionConfig,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            primary_path: PathBuf::from("data/Sheet1 (1).csv"),
            secondary_path: None,
            secondary_sheet: DEFAULT_SHEET.to_string(),
            epsilon: DEFAULT_EPSILON,
            projection: ProjectionConfig::default(),
        }
    }
}

impl LocatorConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read locator config: {:?}", path))?;

        let config: LocatorConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse locator config JSON")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            bail!("epsilon must be a non-negative number, got {}", self.epsilon);
        }

        let p = &self.projection;
        if p.spacing.iter().chain(p.origin.iter()).any(|v| !v.is_finite()) {
            bail!("projection spacing and origin must be finite: {:?} / {:?}", p.spacing, p.origin);
        }
        if !p.shelf_width.is_finite() || p.shelf_width < 0.0 {
            bail!("shelf_width must be a non-negative number, got {}", p.shelf_width);
        }

        Ok(())
    }

    pub fn primary_source(&self) -> ShelfGridSource {
        ShelfGridSource::new(&self.primary_path)
    }

    pub fn secondary_source(&self) -> Option<RangeRecordSource> {
        self.secondary_path
            .as_ref()
            .map(|path| RangeRecordSource::new(path, Some(&self.secondary_sheet)))
    }

    /// Lazily loading cache over the configured sources
    pub fn table_cache(&self) -> TableCache {
        let cache = TableCache::new(self.primary_source());
        match self.secondary_source() {
            Some(secondary) => cache.with_secondary(secondary),
            None => cache,
        }
    }
}
