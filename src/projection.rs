//! Grid-to-World Projection
//!
//! Maps a discrete shelf address to a continuous position for the 3D viewer:
//!
//! ```text
//! world = origin + (sign · cell − 1) · spacing      sign = −1 on inverted axes
//! ```
//!
//! so cell 1 lands exactly on `origin`. Within a shelf, items are assumed to be
//! shelved left to right by increasing class number, which lets the depth axis
//! be refined from where the number falls inside its matched range.

use serde::{Deserialize, Serialize};

use crate::config::ProjectionConfig;

/// Discrete shelf address: x = shelf depth index, y = shelf position, z = row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub z: Option<i64>,
}

impl GridCell {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }
}

/// Continuous position; all components present or all absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    #[serde(rename = "X")]
    pub x: Option<f64>,
    #[serde(rename = "Y")]
    pub y: Option<f64>,
    #[serde(rename = "Z")]
    pub z: Option<f64>,
}

impl WorldPosition {
    pub const UNRESOLVED: WorldPosition = WorldPosition {
        x: None,
        y: None,
        z: None,
    };

    pub fn is_resolved(&self) -> bool {
        self.x.is_some()
    }
}

/// Project a grid cell to world coordinates
///
/// An incomplete cell yields [`WorldPosition::UNRESOLVED`], never a partial
/// position.
pub fn project(cell: &GridCell, config: &ProjectionConfig) -> WorldPosition {
    let (Some(x), Some(y), Some(z)) = (cell.x, cell.y, cell.z) else {
        return WorldPosition::UNRESOLVED;
    };

    let axis = |i: usize, value: i64| -> f64 {
        let sign = if config.axis_inversion[i] { -1.0 } else { 1.0 };
        config.origin[i] + (sign * value as f64 - 1.0) * config.spacing[i]
    };

    WorldPosition {
        x: Some(axis(0, x)),
        y: Some(axis(1, y)),
        z: Some(axis(2, z)),
    }
}

/// Fractional position of `number` inside `[start, end]`, clamped to `[0, 1]`
///
/// A degenerate range (`start == end`) puts the item mid-shelf.
pub fn intra_shelf_fraction(number: f64, start: f64, end: f64) -> f64 {
    if end <= start {
        return 0.5;
    }
    ((number - start) / (end - start)).clamp(0.0, 1.0)
}

/// Shift the shelf-depth axis by the item's offset from mid-shelf
pub fn refine(coarse: &WorldPosition, fraction: f64, shelf_width: f64) -> WorldPosition {
    WorldPosition {
        x: coarse.x.map(|x| x + (fraction - 0.5) * shelf_width),
        ..*coarse
    }
}
