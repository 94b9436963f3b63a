//! Primary shelving map: a grid of range-text cells
//!
//! Each CSV line is one physical row ("Estantería", legacy "Fila"). Every
//! column whose header starts with "Anaquel" is one shelf position, and each
//! cell holds the classification range shelved there, e.g. `"120-180"` or
//! `"120 a 180"`. Sparse maps are normal: blank and unreadable cells are
//! skipped without failing the load.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::path::PathBuf;

use super::{cell_at, read_csv_as_text, RangeEntry, RangeSource, RangeTable, SourceKind};
use crate::utils::{header_number, normalize_header, parse_signature_number};

/// Row column aliases, most preferred first
const ROW_HEADERS: [&str; 3] = ["estanteria", "fila", "row"];

/// Header prefixes marking a shelf-position column
const SHELF_PREFIXES: [&str; 2] = ["anaquel", "shelf"];

static SPANISH_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+a\s+").expect("valid range separator pattern")
});

/// Parse a range cell such as `"120-180"`, `"120,5 – 180"` or `"120 a 180"`
///
/// Returns `(start, end)` with `start <= end`, or `None` unless the cell holds
/// exactly two readable numbers. A bound that is not a plain number falls back
/// to signature extraction, so annotations like `"120 (novela)"` still parse.
pub fn parse_range_text(raw: &str) -> Option<(f64, f64)> {
    let text = raw
        .trim()
        .replace(',', ".")
        .replace(['\u{2013}', '\u{2014}'], "-");
    if text.is_empty() {
        return None;
    }

    let mut parts: Vec<&str> = text.split('-').filter(|p| !p.trim().is_empty()).collect();
    if parts.len() != 2 {
        parts = SPANISH_SEPARATOR
            .split(&text)
            .filter(|p| !p.trim().is_empty())
            .collect();
    }

    let [first, second] = parts.as_slice() else {
        return None;
    };

    let a = range_bound(first)?;
    let b = range_bound(second)?;
    Some((a.min(b), a.max(b)))
}

fn range_bound(part: &str) -> Option<f64> {
    part.trim()
        .parse::<f64>()
        .ok()
        .or_else(|| parse_signature_number(part))
        .filter(|v| v.is_finite())
}

/// CSV-backed shelf grid
#[derive(Debug, Clone)]
pub struct ShelfGridSource {
    path: PathBuf,
}

impl ShelfGridSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Build the range table from an already loaded grid frame
    pub fn table_from_frame(df: &DataFrame) -> Result<RangeTable> {
        let columns = df.get_columns();

        let row_columns: Vec<&Column> = ROW_HEADERS
            .iter()
            .filter_map(|alias| {
                columns
                    .iter()
                    .find(|c| normalize_header(c.name().as_str()) == *alias)
            })
            .collect();

        let shelf_columns: Vec<(&Column, Option<i64>)> = columns
            .iter()
            .filter(|c| {
                let header = normalize_header(c.name().as_str());
                SHELF_PREFIXES.iter().any(|prefix| header.starts_with(prefix))
            })
            .map(|c| (c, header_number(c.name().as_str())))
            .collect();

        if shelf_columns.is_empty() {
            bail!(
                "No shelf-position columns (\"Anaquel N\") found. Available columns: {:?}",
                df.get_column_names()
            );
        }
        if row_columns.is_empty() {
            tracing::warn!("Shelf grid has no row column (Estantería/Fila); rows will be empty");
        }

        let mut entries = Vec::new();
        let mut skipped = 0usize;

        for idx in 0..df.height() {
            let row = row_columns
                .iter()
                .map(|c| cell_at(c, idx))
                .find(|cell| !cell.is_absent())
                .and_then(|cell| cell.as_i64());

            for (column, shelf_position) in &shelf_columns {
                let cell = cell_at(column, idx);
                let Some(text) = cell.as_text() else {
                    continue;
                };

                match parse_range_text(&text) {
                    Some((start, end)) => {
                        entries.push(RangeEntry::new(row, *shelf_position, start, end));
                    }
                    None => {
                        skipped += 1;
                        tracing::debug!(
                            "Skipping range cell {:?} (line {}, column {:?})",
                            text,
                            idx + 2,
                            column.name().as_str()
                        );
                    }
                }
            }
        }

        Ok(RangeTable::new(SourceKind::Primary, entries).with_skipped_cells(skipped))
    }
}

impl RangeSource for ShelfGridSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Primary
    }

    fn describe(&self) -> String {
        format!("shelf grid {}", self.path.display())
    }

    fn load(&self) -> Result<RangeTable> {
        let df = read_csv_as_text(&self.path)?;
        let table = Self::table_from_frame(&df)?;

        tracing::info!(
            "Loaded {} ranges from {} ({} unreadable cells skipped)",
            table.len(),
            self.describe(),
            table.skipped_cells()
        );

        Ok(table)
    }
}
