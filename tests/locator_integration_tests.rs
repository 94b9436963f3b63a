// Locator Integration Tests
//
// Purpose: Load both shelving maps from CSV files on disk and run full lookups
// Run with: cargo test --test locator_integration_tests

use approx::assert_relative_eq;
use polars::prelude::*;
use signature_locator::{
    load_primary_table, load_secondary_table, LocateError, Locator, LocatorConfig, SourceKind,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SHELF_GRID: &str = "\
Estantería,Anaquel 1,Anaquel 2,Anaquel 3,Notas
1,000-099,100 a 199,\"150,5 – 160\",General
2,200-299,,sin datos,
3,300—399,400-499,\"120 a 180\",
";

const RANGE_RECORDS: &str = "\
Fila,Estantería,Anaquel,Rango inicio,Rango fin,Texto original,Anaquel original
1,2,2,1502,1600,150.2 a 160,A2
3,1,1,300,399,300-399,C1
4,1,1,,450,???,D1
";

fn write_fixtures() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("Sheet1 (1).csv"), SHELF_GRID).unwrap();

    let sheets = dir.path().join("rangos");
    fs::create_dir(&sheets).unwrap();
    fs::write(sheets.join("Rangos.csv"), RANGE_RECORDS).unwrap();
    fs::write(sheets.join("Vacia.csv"), "Fila,Rango inicio,Rango fin\n").unwrap();

    dir
}

fn config_for(dir: &Path, with_secondary: bool) -> LocatorConfig {
    LocatorConfig {
        primary_path: dir.join("Sheet1 (1).csv"),
        secondary_path: with_secondary.then(|| dir.join("rangos")),
        ..Default::default()
    }
}

// =========================================================================
// Section 1: Table loading
// =========================================================================

#[test]
fn test_primary_grid_loading() {
    let dir = write_fixtures();
    let table = load_primary_table(dir.path().join("Sheet1 (1).csv")).unwrap();

    assert_eq!(table.source(), SourceKind::Primary);
    // 3 + 1 + 3 readable cells, "sin datos" skipped, blank ignored
    assert_eq!(table.len(), 7);
    assert_eq!(table.skipped_cells(), 1);

    let comma_dash = table
        .entries()
        .iter()
        .find(|e| e.row == Some(1) && e.shelf_position == Some(3))
        .unwrap();
    assert_relative_eq!(comma_dash.range_start, 150.5);
    assert_relative_eq!(comma_dash.range_fin, 160.0);

    let em_dash = table
        .entries()
        .iter()
        .find(|e| e.row == Some(3) && e.shelf_position == Some(1))
        .unwrap();
    assert_eq!((em_dash.range_start, em_dash.range_fin), (300.0, 399.0));
}

#[test]
fn test_secondary_sheet_loading() {
    let dir = write_fixtures();
    let table = load_secondary_table(dir.path().join("rangos"), None).unwrap();

    assert_eq!(table.source(), SourceKind::Secondary);
    assert_eq!(table.len(), 2);
    assert_eq!(table.incomplete().len(), 1);

    let repaired = &table.entries()[0];
    assert_relative_eq!(repaired.range_start, 150.2);
    assert_relative_eq!(repaired.range_fin, 160.0);
    assert_eq!(repaired.shelf_index, Some(2));
    assert_eq!(repaired.original_label.as_deref(), Some("A2"));

    let empty = load_secondary_table(dir.path().join("rangos"), Some("Vacia")).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_missing_sheet_is_load_error() {
    let dir = write_fixtures();
    let err = load_secondary_table(dir.path().join("rangos"), Some("NoExiste")).unwrap_err();
    assert!(format!("{:#}", err).contains("NoExiste.csv"));
}

#[test]
fn test_secondary_single_csv_with_joined_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mapa_rangos.csv");
    fs::write(
        &path,
        "Fila,Estanteria,Anaquel,RangoInicio,RangoFin,AnaquelOriginal\n\
         1,2,4,8634,8639,A4\n\
         2,1,1,100,200,B1\n",
    )
    .unwrap();

    // A plain file path ignores the sheet selector
    let table = load_secondary_table(&path, Some("Otra")).unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.incomplete().is_empty());

    let first = &table.entries()[0];
    assert_eq!((first.row, first.shelf_index, first.shelf_position), (Some(1), Some(2), Some(4)));
    assert_relative_eq!(first.range_start, 863.4);
    assert_relative_eq!(first.range_fin, 863.9);
    assert_eq!(first.original_label.as_deref(), Some("A4"));
}

#[test]
fn test_secondary_parquet_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rangos.parquet");

    let mut df = df![
        "Fila" => &[2i64, 1],
        "Estantería" => &[None, Some(1i64)],
        "Anaquel" => &[1i64, 3],
        "RangoInicio" => &[300i64, 1202],
        "RangoFin" => &[399.0f64, 1209.0],
    ]
    .unwrap();
    let file = fs::File::create(&path).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();

    let table = load_secondary_table(&path, None).unwrap();
    assert_eq!(table.source(), SourceKind::Secondary);
    assert_eq!(table.len(), 2);

    let repaired = &table.entries()[0];
    assert_eq!((repaired.row, repaired.shelf_index, repaired.shelf_position), (Some(1), Some(1), Some(3)));
    assert_relative_eq!(repaired.range_start, 120.2);
    assert_relative_eq!(repaired.range_fin, 120.9);

    let plain = &table.entries()[1];
    assert_eq!(plain.shelf_index, None);
    assert_eq!((plain.range_start, plain.range_fin), (300.0, 399.0));
}

#[test]
fn test_canonical_dump_is_reproducible() {
    let dir = write_fixtures();
    let path = dir.path().join("Sheet1 (1).csv");

    let mut first = Vec::new();
    load_primary_table(&path).unwrap().write_csv(&mut first).unwrap();
    let mut second = Vec::new();
    load_primary_table(&path).unwrap().write_csv(&mut second).unwrap();

    assert_eq!(first, second);
    let text = String::from_utf8(first).unwrap();
    assert_eq!(text.lines().count(), 8);
}

// =========================================================================
// Section 2: Lookups through the cache
// =========================================================================

#[test]
fn test_primary_only_lookup() {
    let dir = write_fixtures();
    let config = config_for(dir.path(), false);
    let cache = config.table_cache();
    let locator = Locator::from_config(&config);

    // 155.3 sits in 100-199, 120-180 and the narrowest 150.5-160
    let result = locator.locate_with_cache("155.3 M67s", &cache).unwrap();
    assert_eq!(result.source, SourceKind::Primary);
    assert_eq!((result.row, result.shelf_position), (Some(1), Some(3)));
    assert_eq!(result.grid.x, Some(1));
    assert_eq!(result.diagnostics.primary.as_ref().unwrap().candidates, 3);

    let world = result.world_center;
    assert_relative_eq!(world.x.unwrap(), 0.0);
    assert_relative_eq!(world.y.unwrap(), 0.7, epsilon = 1e-9);
    assert_relative_eq!(world.z.unwrap(), 0.0);
}

#[test]
fn test_secondary_overrides_primary() {
    let dir = write_fixtures();
    let config = config_for(dir.path(), true);
    let cache = config.table_cache();
    let locator = Locator::from_config(&config);

    let result = locator.locate_with_cache("155.3 M67s", &cache).unwrap();

    assert_eq!(result.source, SourceKind::Secondary);
    assert_eq!((result.row, result.shelf_position, result.shelf_index), (Some(1), Some(2), Some(2)));
    assert_eq!(result.grid.x, Some(2));

    let diagnostics = &result.diagnostics;
    assert_eq!(diagnostics.primary.as_ref().unwrap().entry.shelf_position, Some(3));
    assert_eq!(
        diagnostics.secondary.as_ref().unwrap().entry.original_text.as_deref(),
        Some("150.2 a 160")
    );
    assert_eq!(diagnostics.agree, Some(false));
}

#[test]
fn test_error_taxonomy() {
    let dir = write_fixtures();
    let config = config_for(dir.path(), true);
    let cache = config.table_cache();
    let locator = Locator::from_config(&config);

    let err = locator.locate_with_cache("M67s", &cache).unwrap_err();
    assert!(matches!(err, LocateError::ParseFailure { .. }));

    let err = locator.locate_with_cache("999.9 Z1", &cache).unwrap_err();
    assert!(matches!(err, LocateError::NoMatch { .. }));
    assert_eq!(err.input(), Some("999.9 Z1"));
}

#[test]
fn test_missing_source_then_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), false);
    let cache = config.table_cache();
    let locator = Locator::from_config(&config);

    let err = locator.locate_with_cache("001.2 M67s", &cache).unwrap_err();
    assert!(matches!(err, LocateError::SourceLoad { .. }));
    assert_eq!(err.input(), Some("001.2 M67s"));
    assert!(err.to_string().contains("Sheet1 (1).csv"));

    fs::write(dir.path().join("Sheet1 (1).csv"), SHELF_GRID).unwrap();
    cache.force_reload().unwrap();

    let result = locator.locate_with_cache("105", &cache).unwrap();
    assert_eq!((result.row, result.shelf_position), (Some(1), Some(2)));
}

#[test]
fn test_reload_identical_source_is_equal() {
    let dir = write_fixtures();
    let cache = config_for(dir.path(), true).table_cache();

    let before = cache.get_or_load().unwrap();
    let after = cache.force_reload().unwrap();
    assert_eq!(*before, *after);
}
