//! Tagged cell values for human-authored spreadsheet data
//!
//! Shelving maps are typed by hand, so one column can hold integers, decimals,
//! free text and blanks side by side. Every cell is resolved into a
//! [`CellValue`] as soon as it leaves polars; loaders then coerce it into the
//! strongly typed range records.

use polars::prelude::AnyValue;

/// Spellings treated as an empty cell
const MISSING_MARKERS: [&str; 6] = ["na", "n/a", "nan", "null", "none", "-"];

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Absent,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Classify raw cell text
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || MISSING_MARKERS
                .iter()
                .any(|marker| trimmed.eq_ignore_ascii_case(marker))
        {
            return CellValue::Absent;
        }

        if let Ok(v) = trimmed.parse::<i64>() {
            return CellValue::Integer(v);
        }

        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => CellValue::Float(v),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    /// Numeric view of the cell; text accepts a decimal comma
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Absent => None,
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            CellValue::Text(s) => s
                .trim()
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite()),
        }
    }

    /// Discrete view of the cell (row, shelf, position numbers)
    ///
    /// Decimals are truncated, so `"3.0"` and `3.7` both give 3.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(v) => Some(*v),
            _ => self.as_f64().map(|v| v.trunc() as i64),
        }
    }

    /// Text view of the cell, used for diagnostic metadata
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Absent => None,
            CellValue::Integer(v) => Some(v.to_string()),
            CellValue::Float(v) => Some(v.to_string()),
            CellValue::Text(s) => Some(s.clone()),
        }
    }
}

impl From<AnyValue<'_>> for CellValue {
    fn from(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => CellValue::Absent,
            AnyValue::String(s) => CellValue::from_text(s),
            AnyValue::StringOwned(s) => CellValue::from_text(s.as_str()),
            AnyValue::Int8(v) => CellValue::Integer(v as i64),
            AnyValue::Int16(v) => CellValue::Integer(v as i64),
            AnyValue::Int32(v) => CellValue::Integer(v as i64),
            AnyValue::Int64(v) => CellValue::Integer(v),
            AnyValue::UInt8(v) => CellValue::Integer(v as i64),
            AnyValue::UInt16(v) => CellValue::Integer(v as i64),
            AnyValue::UInt32(v) => CellValue::Integer(v as i64),
            AnyValue::UInt64(v) => match i64::try_from(v) {
                Ok(v) => CellValue::Integer(v),
                Err(_) => CellValue::Float(v as f64),
            },
            AnyValue::Float32(v) if v.is_finite() => CellValue::Float(v as f64),
            AnyValue::Float64(v) if v.is_finite() => CellValue::Float(v),
            AnyValue::Float32(_) | AnyValue::Float64(_) => CellValue::Absent,
            other => CellValue::from_text(&other.to_string()),
        }
    }
}
