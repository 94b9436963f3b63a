//! Signature Locator - main coordinator for shelf lookups
//!
//! Parses the signature, finds the narrowest enclosing range in each shelving
//! map, reconciles the two maps and projects the winning shelf into world
//! coordinates.
//!
//! Reconciliation: the secondary map carries shelf depth and explicit bounds,
//! so its match is authoritative. The primary match is reported alongside as
//! a cross-check; the caller decides what to do with a disagreement.

use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

use crate::cache::TableCache;
use crate::config::{LocatorConfig, ProjectionConfig, DEFAULT_EPSILON};
use crate::data::{cmp_missing_last, RangeEntry, RangeTable, SourceKind};
use crate::error::LocateError;
use crate::projection::{intra_shelf_fraction, project, refine, GridCell, WorldPosition};
use crate::utils::parse_signature_number;

/// Best range one shelving map offers for a number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMatch {
    pub source: SourceKind,
    #[serde(flatten)]
    pub entry: RangeEntry,
    pub width: f64,
    /// Ranges in this map that contained the number
    pub candidates: usize,
}

/// What each consulted map produced on its own
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocateDiagnostics {
    pub primary: Option<SourceMatch>,
    pub secondary: Option<SourceMatch>,
    pub secondary_consulted: bool,
    /// Same row and shelf position in both maps; `None` unless both matched
    pub agree: Option<bool>,
}

/// Resolved shelf location for one signature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocateResult {
    pub input: String,
    pub numeric: f64,
    pub source: SourceKind,
    pub row: Option<i64>,
    pub shelf_position: Option<i64>,
    pub shelf_index: Option<i64>,
    pub range_start: f64,
    pub range_fin: f64,
    pub grid: GridCell,
    pub world_center: WorldPosition,
    /// Position of the number inside its range, 0 = range start
    pub intra_shelf: Option<f64>,
    pub world_precise: Option<WorldPosition>,
    pub diagnostics: LocateDiagnostics,
}

/// Narrowest range in `table` containing `value`
///
/// Equal widths are broken by lowest row, shelf position, shelf index, then
/// range start, with missing coordinates ranked last.
pub fn best_match(value: f64, table: &RangeTable, epsilon: f64) -> Option<SourceMatch> {
    let candidates: Vec<&RangeEntry> = table
        .entries()
        .iter()
        .filter(|entry| entry.contains(value, epsilon))
        .collect();

    let best = candidates.iter().copied().min_by(|a, b| narrowest_first(a, b))?;

    Some(SourceMatch {
        source: table.source(),
        entry: best.clone(),
        width: best.width(),
        candidates: candidates.len(),
    })
}

fn narrowest_first(a: &RangeEntry, b: &RangeEntry) -> Ordering {
    a.width()
        .total_cmp(&b.width())
        .then_with(|| cmp_missing_last(a.row, b.row))
        .then_with(|| cmp_missing_last(a.shelf_position, b.shelf_position))
        .then_with(|| cmp_missing_last(a.shelf_index, b.shelf_index))
        .then_with(|| a.range_start.total_cmp(&b.range_start))
}

#[derive(Debug, Clone)]
pub struct Locator {
    epsilon: f64,
    projection: ProjectionConfig,
}

impl Default for Locator {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON, ProjectionConfig::default())
    }
}

impl Locator {
    pub fn new(epsilon: f64, projection: ProjectionConfig) -> Self {
        Self { epsilon, projection }
    }

    pub fn from_config(config: &LocatorConfig) -> Self {
        Self::new(config.epsilon, config.projection.clone())
    }

    /// Locate one signature against the primary and optional secondary map
    pub fn locate(
        &self,
        signature: &str,
        primary: &RangeTable,
        secondary: Option<&RangeTable>,
    ) -> Result<LocateResult, LocateError> {
        let value = parse_signature_number(signature).ok_or_else(|| LocateError::ParseFailure {
            input: signature.to_string(),
        })?;

        let primary_match = best_match(value, primary, self.epsilon);
        let secondary_match = secondary.and_then(|table| best_match(value, table, self.epsilon));

        let agree = match (&primary_match, &secondary_match) {
            (Some(p), Some(s)) => Some(
                p.entry.row == s.entry.row && p.entry.shelf_position == s.entry.shelf_position,
            ),
            _ => None,
        };
        if agree == Some(false) {
            tracing::warn!(
                "Shelving maps disagree for {:?} (value {}): primary row {:?} shelf {:?}, secondary row {:?} shelf {:?}",
                signature,
                value,
                primary_match.as_ref().and_then(|m| m.entry.row),
                primary_match.as_ref().and_then(|m| m.entry.shelf_position),
                secondary_match.as_ref().and_then(|m| m.entry.row),
                secondary_match.as_ref().and_then(|m| m.entry.shelf_position),
            );
        }

        let chosen = secondary_match
            .as_ref()
            .or(primary_match.as_ref())
            .cloned()
            .ok_or_else(|| LocateError::NoMatch {
                input: signature.to_string(),
                value,
            })?;

        let entry = &chosen.entry;
        let grid = GridCell {
            x: Some(entry.shelf_index.unwrap_or(1)),
            y: entry.shelf_position,
            z: entry.row,
        };
        let world_center = project(&grid, &self.projection);

        let (intra_shelf, world_precise) = if self.projection.use_intra_shelf_refinement {
            let fraction = intra_shelf_fraction(value, entry.range_start, entry.range_fin);
            (
                Some(fraction),
                Some(refine(&world_center, fraction, self.projection.shelf_width)),
            )
        } else {
            (None, None)
        };

        tracing::debug!(
            "Located {:?} -> {} row {:?} shelf {:?} ({} candidates)",
            signature,
            chosen.source,
            entry.row,
            entry.shelf_position,
            chosen.candidates
        );

        Ok(LocateResult {
            input: signature.to_string(),
            numeric: value,
            source: chosen.source,
            row: entry.row,
            shelf_position: entry.shelf_position,
            shelf_index: entry.shelf_index,
            range_start: entry.range_start,
            range_fin: entry.range_fin,
            grid,
            world_center,
            intra_shelf,
            world_precise,
            diagnostics: LocateDiagnostics {
                primary: primary_match,
                secondary: secondary_match,
                secondary_consulted: secondary.is_some(),
                agree,
            },
        })
    }

    /// Locate against the cached tables, loading them on first use
    pub fn locate_with_cache(
        &self,
        signature: &str,
        cache: &TableCache,
    ) -> Result<LocateResult, LocateError> {
        let tables = cache
            .get_or_load()
            .map_err(|err| err.with_input(signature))?;
        self.locate(signature, &tables.primary, tables.secondary.as_ref())
    }

    /// Locate many signatures in parallel; results keep input order
    pub fn locate_batch<S>(
        &self,
        signatures: &[S],
        primary: &RangeTable,
        secondary: Option<&RangeTable>,
    ) -> Vec<Result<LocateResult, LocateError>>
    where
        S: AsRef<str> + Sync,
    {
        signatures
            .par_iter()
            .map(|signature| self.locate(signature.as_ref(), primary, secondary))
            .collect()
    }
}
