//! Utility modules for signature location
//!
//! Contains shared functionality used by the loaders and the locator:
//! - Signature: Classification number extraction from call signatures
//! - Dewey: Repair of class numbers stored without their decimal point
//! - Cells: Tagged spreadsheet cell values
//! - Headers: Accent- and case-insensitive column header matching

pub mod signature;
pub mod dewey;
pub mod cells;
pub mod headers;

// Re-export commonly used items
pub use signature::parse_signature_number;
pub use dewey::fix_malformed_dewey;
pub use cells::CellValue;
pub use headers::{normalize_header, header_number};
