//! Signature Locator
//!
//! Resolves library call signatures ("001.2 M67s") to a shelf location and a
//! 3D world coordinate for the catalog viewer.
//!
//! Module layout:
//! - `utils/`: Signature number extraction, Dewey repair, cell and header helpers
//! - `data/`: Range tables loaded from the primary shelf grid and the secondary range records
//! - `cache`: Load-once table cache with explicit reload
//! - `locator`: Narrowest-range matching and cross-map reconciliation
//! - `projection`: Grid-to-world transform with intra-shelf refinement
//! - `config`: Spacing, origin, tolerance and source paths
//! - `error`: Lookup error taxonomy

pub mod utils;
pub mod data;
pub mod cache;
pub mod config;
pub mod error;
pub mod locator;
pub mod projection;

// Re-export commonly used types
pub use utils::{parse_signature_number, fix_malformed_dewey, CellValue};
pub use data::{
    load_primary_table, load_secondary_table, parse_range_text, IncompleteRecord, RangeEntry,
    RangeRecordSource, RangeSource, RangeTable, ShelfGridSource, SourceKind,
};
pub use cache::{LoadedTables, TableCache};
pub use config::{LocatorConfig, ProjectionConfig};
pub use error::LocateError;
pub use locator::{best_match, LocateDiagnostics, LocateResult, Locator, SourceMatch};
pub use projection::{intra_shelf_fraction, project, refine, GridCell, WorldPosition};
