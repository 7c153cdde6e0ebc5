//! CSV import of expense history.
//!
//! Two dialects are understood: the canonical export written by
//! [`crate::export`] and the legacy French-headed spreadsheet export.

mod csv_import;
mod detect;

use std::path::Path;

use crate::error::Result;
use crate::models::ExpenseRecord;

pub(crate) use csv_import::{parse_decimal, CsvImporter};
pub(crate) use detect::CANONICAL_HEADERS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Add the imported records after the existing ones.
    #[default]
    Append,
    /// Discard the existing ledger.
    Replace,
}

/// Read and map every row of `path`. Nothing is validated against the
/// taxonomy here.
pub fn read_file(path: &Path) -> Result<Vec<ExpenseRecord>> {
    CsvImporter::read(path)
}
