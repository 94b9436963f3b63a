//! Range Table Loading and Management
//!
//! Builds shelf range tables from the two shelving maps using Polars:
//! - `shelf_grid`: primary CSV, one row per shelf row and one range-text
//!   column per shelf position ("Anaquel 1", "Anaquel 2", ...)
//! - `range_records`: secondary record-oriented sheet with explicit bounds,
//!   shelf coordinates and the original free text kept for diagnostics
//!
//! Both produce a [`RangeTable`] through the [`RangeSource`] capability.

pub mod shelf_grid;
pub mod range_records;

pub use shelf_grid::{parse_range_text, ShelfGridSource};
pub use range_records::{RangeRecordSource, DEFAULT_SHEET};

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::utils::CellValue;

/// Which shelving map a table or match came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Primary,
    Secondary,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Primary => write!(f, "primary"),
            SourceKind::Secondary => write!(f, "secondary"),
        }
    }
}

/// One (row, shelf position) bucket of classification numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeEntry {
    pub row: Option<i64>,
    pub shelf_position: Option<i64>,
    /// Shelf depth index; only the secondary map carries it
    pub shelf_index: Option<i64>,
    pub range_start: f64,
    pub range_fin: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_label: Option<String>,
}

impl RangeEntry {
    /// Create an entry, swapping bounds stored in reverse
    pub fn new(row: Option<i64>, shelf_position: Option<i64>, start: f64, end: f64) -> Self {
        Self {
            row,
            shelf_position,
            shelf_index: None,
            range_start: start.min(end),
            range_fin: start.max(end),
            original_text: None,
            original_label: None,
        }
    }

    pub fn with_shelf_index(mut self, shelf_index: Option<i64>) -> Self {
        self.shelf_index = shelf_index;
        self
    }

    pub fn with_metadata(mut self, original_text: Option<String>, original_label: Option<String>) -> Self {
        self.original_text = original_text;
        self.original_label = original_label;
        self
    }

    pub fn width(&self) -> f64 {
        self.range_fin - self.range_start
    }

    /// Closed-interval membership widened by `epsilon` on both sides
    pub fn contains(&self, value: f64, epsilon: f64) -> bool {
        self.range_start - epsilon <= value && value <= self.range_fin + epsilon
    }
}

/// Secondary-map record whose range bounds could not be read
///
/// Never matched; kept so reports can point at the offending sheet line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncompleteRecord {
    /// 1-based line in the source sheet, header included
    pub line: usize,
    pub row: Option<i64>,
    pub shelf_position: Option<i64>,
    pub shelf_index: Option<i64>,
    pub range_start: Option<f64>,
    pub range_fin: Option<f64>,
    pub original_text: Option<String>,
    pub original_label: Option<String>,
}

/// Loaded shelving map in canonical order
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTable {
    source: SourceKind,
    entries: Vec<RangeEntry>,
    incomplete: Vec<IncompleteRecord>,
    skipped_cells: usize,
}

impl RangeTable {
    /// Build a table, sorting entries by (row, shelf position, range start)
    pub fn new(source: SourceKind, mut entries: Vec<RangeEntry>) -> Self {
        entries.sort_by(canonical_order);
        Self {
            source,
            entries,
            incomplete: Vec::new(),
            skipped_cells: 0,
        }
    }

    pub fn with_incomplete(mut self, incomplete: Vec<IncompleteRecord>) -> Self {
        self.incomplete = incomplete;
        self
    }

    pub fn with_skipped_cells(mut self, skipped_cells: usize) -> Self {
        self.skipped_cells = skipped_cells;
        self
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn entries(&self) -> &[RangeEntry] {
        &self.entries
    }

    pub fn incomplete(&self) -> &[IncompleteRecord] {
        &self.incomplete
    }

    /// Non-blank range cells that did not parse into two bounds
    pub fn skipped_cells(&self) -> usize {
        self.skipped_cells
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical columnar view of the table
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows: Vec<Option<i64>> = self.entries.iter().map(|e| e.row).collect();
        let positions: Vec<Option<i64>> = self.entries.iter().map(|e| e.shelf_position).collect();
        let indices: Vec<Option<i64>> = self.entries.iter().map(|e| e.shelf_index).collect();
        let starts: Vec<f64> = self.entries.iter().map(|e| e.range_start).collect();
        let fins: Vec<f64> = self.entries.iter().map(|e| e.range_fin).collect();

        df!(
            "row" => rows,
            "shelf_position" => positions,
            "shelf_index" => indices,
            "range_start" => starts,
            "range_fin" => fins,
        )
    }

    /// Write the canonical view as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut df = self
            .to_dataframe()
            .with_context(|| format!("Failed to build {} range frame", self.source))?;

        CsvWriter::new(writer)
            .include_header(true)
            .finish(&mut df)
            .with_context(|| format!("Failed to write {} range table", self.source))
    }
}

/// Capability shared by both shelving maps: produce a fresh [`RangeTable`]
pub trait RangeSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Human-readable origin for logs and load errors
    fn describe(&self) -> String;

    fn load(&self) -> Result<RangeTable>;
}

/// Load the primary shelf grid CSV
pub fn load_primary_table(path: impl AsRef<Path>) -> Result<RangeTable> {
    ShelfGridSource::new(path.as_ref()).load()
}

/// Load one sheet of the secondary range records
pub fn load_secondary_table(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<RangeTable> {
    RangeRecordSource::new(path.as_ref(), sheet).load()
}

/// Read a CSV keeping every column as text
///
/// Type inference is disabled: a column mixing "3" and "120-180" must not
/// fail the whole load. Cells are typed afterwards through [`CellValue`].
pub(crate) fn read_csv_as_text(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to load CSV: {}", path.display()))
}

pub(crate) fn cell_at(column: &Column, idx: usize) -> CellValue {
    column
        .get(idx)
        .map(CellValue::from)
        .unwrap_or(CellValue::Absent)
}

/// Ascending order with absent keys last
pub(crate) fn cmp_missing_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn canonical_order(a: &RangeEntry, b: &RangeEntry) -> Ordering {
    cmp_missing_last(a.row, b.row)
        .then_with(|| cmp_missing_last(a.shelf_position, b.shelf_position))
        .then_with(|| a.range_start.total_cmp(&b.range_start))
        .then_with(|| cmp_missing_last(a.shelf_index, b.shelf_index))
        .then_with(|| a.range_fin.total_cmp(&b.range_fin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_swaps_reversed_bounds() {
        let entry = RangeEntry::new(Some(1), Some(2), 180.0, 120.0);
        assert_eq!(entry.range_start, 120.0);
        assert_eq!(entry.range_fin, 180.0);
        assert_eq!(entry.width(), 60.0);
    }

    #[test]
    fn test_contains_with_epsilon() {
        let eps = 1e-6;
        let entry = RangeEntry::new(Some(1), Some(1), 100.0, 200.0);
        assert!(entry.contains(100.0, eps));
        assert!(entry.contains(200.0, eps));
        assert!(entry.contains(200.0 + eps / 2.0, eps));
        assert!(!entry.contains(200.0 + 10.0 * eps, eps));
        assert!(!entry.contains(100.0 - 10.0 * eps, eps));
    }

    #[test]
    fn test_table_canonical_order() {
        let table = RangeTable::new(
            SourceKind::Primary,
            vec![
                RangeEntry::new(None, Some(1), 0.0, 10.0),
                RangeEntry::new(Some(2), Some(1), 300.0, 400.0),
                RangeEntry::new(Some(1), Some(2), 150.0, 160.0),
                RangeEntry::new(Some(1), Some(2), 100.0, 200.0),
                RangeEntry::new(Some(1), Some(1), 500.0, 600.0),
            ],
        );

        let keys: Vec<(Option<i64>, Option<i64>, f64)> = table
            .entries()
            .iter()
            .map(|e| (e.row, e.shelf_position, e.range_start))
            .collect();

        assert_eq!(
            keys,
            vec![
                (Some(1), Some(1), 500.0),
                (Some(1), Some(2), 100.0),
                (Some(1), Some(2), 150.0),
                (Some(2), Some(1), 300.0),
                (None, Some(1), 0.0),
            ]
        );
    }

    #[test]
    fn test_to_dataframe_shape() {
        let table = RangeTable::new(
            SourceKind::Secondary,
            vec![
                RangeEntry::new(Some(1), Some(1), 100.0, 200.0).with_shelf_index(Some(2)),
                RangeEntry::new(Some(1), None, 200.0, 300.0),
            ],
        );

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 5);
        assert_eq!(df.column("shelf_position").unwrap().null_count(), 1);
    }

    #[test]
    fn test_write_csv_header() {
        let table = RangeTable::new(
            SourceKind::Primary,
            vec![RangeEntry::new(Some(3), Some(4), 1.5, 2.5)],
        );

        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("row,shelf_position,shelf_index,range_start,range_fin"));
        assert!(text.contains("3,4,,1.5,2.5"));
    }
}
