//! Secondary shelving map: one record per range with explicit bounds
//!
//! Richer than the primary grid: each record names its row, shelf index
//! (depth) and shelf position, and carries the original free-text range and
//! shelf label. Bounds pass through the Dewey repair since this sheet is where
//! `1202` shows up for `120.2`.
//!
//! Workbooks are consumed as per-sheet exports: the source path is either a
//! single CSV/Parquet file or a directory holding `<sheet>.csv` files.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use super::{
    cell_at, read_csv_as_text, IncompleteRecord, RangeEntry, RangeSource, RangeTable, SourceKind,
};
use crate::utils::{fix_malformed_dewey, normalize_header, CellValue};

/// Sheet read when none is selected
pub const DEFAULT_SHEET: &str = "Rangos";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ColumnRole {
    OriginalLabel,
    OriginalText,
    RangeStart,
    RangeEnd,
    ShelfPosition,
    ShelfIndex,
    Row,
}

/// Header prefixes per role; earlier roles win, so "anaquel_original" is a
/// label before it can be a shelf position. Matching ignores `_`, so joined
/// spellings such as "RangoInicio" resolve like "Rango inicio".
const ROLE_PREFIXES: [(ColumnRole, &[&str]); 7] = [
    (ColumnRole::OriginalLabel, &["anaquel_original", "etiqueta", "label"]),
    (ColumnRole::OriginalText, &["rango_original", "texto", "signatura", "original", "text"]),
    (ColumnRole::RangeStart, &["rango_inicio", "inicio", "desde", "range_start", "start"]),
    (ColumnRole::RangeEnd, &["rango_fin", "fin", "hasta", "range_end", "end"]),
    (ColumnRole::ShelfPosition, &["anaquel", "shelf_position", "position"]),
    (ColumnRole::ShelfIndex, &["estanteria", "shelf"]),
    (ColumnRole::Row, &["fila", "row"]),
];

fn role_for(header: &str) -> Option<ColumnRole> {
    let joined = normalize_header(header).replace('_', "");
    ROLE_PREFIXES
        .iter()
        .find(|(_, prefixes)| {
            prefixes
                .iter()
                .any(|p| joined.starts_with(p.replace('_', "").as_str()))
        })
        .map(|(role, _)| *role)
}

/// Record-oriented range sheet
#[derive(Debug, Clone)]
pub struct RangeRecordSource {
    path: PathBuf,
    sheet: String,
}

impl RangeRecordSource {
    pub fn new(path: impl Into<PathBuf>, sheet: Option<&str>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.unwrap_or(DEFAULT_SHEET).to_string(),
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// File actually read: the sheet export when `path` is a directory
    pub fn resolved_path(&self) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.csv", self.sheet))
        } else {
            self.path.clone()
        }
    }

    fn read_frame(path: &Path) -> Result<DataFrame> {
        let is_parquet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

        if is_parquet {
            LazyFrame::scan_parquet(path, Default::default())
                .with_context(|| format!("Failed to scan parquet: {}", path.display()))?
                .collect()
                .with_context(|| format!("Failed to load range records: {}", path.display()))
        } else {
            read_csv_as_text(path)
        }
    }

    /// Build the range table from an already loaded record frame
    pub fn table_from_frame(df: &DataFrame) -> Result<RangeTable> {
        let mut roles: FxHashMap<ColumnRole, &Column> = FxHashMap::default();
        for column in df.get_columns() {
            if let Some(role) = role_for(column.name().as_str()) {
                roles.entry(role).or_insert(column);
            }
        }

        for (role, label) in [
            (ColumnRole::RangeStart, "range start"),
            (ColumnRole::RangeEnd, "range end"),
        ] {
            if !roles.contains_key(&role) {
                bail!(
                    "Missing {} column. Available columns: {:?}",
                    label,
                    df.get_column_names()
                );
            }
        }

        let cell = |role: ColumnRole, idx: usize| -> CellValue {
            roles
                .get(&role)
                .map(|column| cell_at(column, idx))
                .unwrap_or(CellValue::Absent)
        };

        let mut entries = Vec::new();
        let mut incomplete = Vec::new();

        for idx in 0..df.height() {
            let row = cell(ColumnRole::Row, idx).as_i64();
            let shelf_index = cell(ColumnRole::ShelfIndex, idx).as_i64();
            let shelf_position = cell(ColumnRole::ShelfPosition, idx).as_i64();
            let start = cell(ColumnRole::RangeStart, idx).as_f64().map(fix_malformed_dewey);
            let end = cell(ColumnRole::RangeEnd, idx).as_f64().map(fix_malformed_dewey);
            let original_text = cell(ColumnRole::OriginalText, idx).as_text();
            let original_label = cell(ColumnRole::OriginalLabel, idx).as_text();

            match (start, end) {
                (Some(start), Some(end)) => entries.push(
                    RangeEntry::new(row, shelf_position, start, end)
                        .with_shelf_index(shelf_index)
                        .with_metadata(original_text, original_label),
                ),
                _ => {
                    tracing::debug!(
                        "Range record on line {} has no usable bounds ({:?})",
                        idx + 2,
                        original_text
                    );
                    incomplete.push(IncompleteRecord {
                        line: idx + 2,
                        row,
                        shelf_position,
                        shelf_index,
                        range_start: start,
                        range_fin: end,
                        original_text,
                        original_label,
                    });
                }
            }
        }

        Ok(RangeTable::new(SourceKind::Secondary, entries).with_incomplete(incomplete))
    }
}

impl RangeSource for RangeRecordSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Secondary
    }

    fn describe(&self) -> String {
        format!("range records {} [{}]", self.path.display(), self.sheet)
    }

    fn load(&self) -> Result<RangeTable> {
        let path = self.resolved_path();
        let df = Self::read_frame(&path)?;
        let table = Self::table_from_frame(&df)
            .with_context(|| format!("Failed to read {}", self.describe()))?;

        tracing::info!(
            "Loaded {} ranges from {} ({} records without bounds)",
            table.len(),
            self.describe(),
            table.incomplete().len()
        );

        Ok(table)
    }
}
