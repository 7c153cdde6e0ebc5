//! CSV export of the expense history in the canonical dialect.

use std::io::Write;

use crate::db::DATE_FORMAT;
use crate::error::Result;
use crate::import::CANONICAL_HEADERS;
use crate::models::ExpenseRecord;

/// Write `records` as UTF-8 CSV with the canonical header. Returns the number
/// of data rows written.
pub fn write_csv<W: Write>(writer: W, records: &[ExpenseRecord]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CANONICAL_HEADERS)?;

    for record in records {
        wtr.write_record([
            record.date.format(DATE_FORMAT).to_string().as_str(),
            record.store.as_str(),
            record.category.as_str(),
            record.subcategory.as_str(),
            record.amount.to_string().as_str(),
            record.reference.as_deref().unwrap_or(""),
            record.note.as_deref().unwrap_or(""),
        ])?;
    }
    wtr.flush()?;
    Ok(records.len())
}
