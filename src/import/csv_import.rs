use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use super::detect::{detect_dialect, CsvProfile};
use crate::error::{Error, ParseError, Result};
use crate::models::{is_sentinel, ExpenseRecord};

/// A data row with the 1-based line it was read from.
type CsvRow = (u64, Vec<String>);

pub(crate) struct CsvImporter;

impl CsvImporter {
    /// Read the whole file and map every data row onto an [`ExpenseRecord`].
    /// Any row that does not map fails the whole read.
    pub(crate) fn read(path: &Path) -> Result<Vec<ExpenseRecord>> {
        let (headers, rows) = Self::read_rows(path)?;
        let profile = detect_dialect(&headers).ok_or_else(|| {
            Error::malformed(
                path,
                1,
                format!("unrecognized header: {}", headers.join(",")),
            )
        })?;
        tracing::debug!(dialect = profile.name, rows = rows.len(), "Detected import dialect");
        Self::parse(path, &rows, &profile)
    }

    fn read_rows(path: &Path) -> Result<(Vec<String>, Vec<CsvRow>)> {
        let file = std::fs::File::open(path).map_err(|e| Error::unavailable(path, e))?;
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(file);

        let mut all_rows: Vec<CsvRow> = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| {
                let line = e.position().map_or(0, |p| p.line());
                Error::malformed(path, line, e)
            })?;
            let line = record.position().map_or(all_rows.len() as u64 + 1, |p| p.line());
            all_rows.push((line, record.iter().map(|s| s.to_string()).collect()));
        }

        if all_rows.is_empty() {
            return Err(Error::malformed(path, 1, "file is empty"));
        }
        let (_, headers) = all_rows.remove(0);
        Ok((headers, all_rows))
    }

    pub(crate) fn parse(path: &Path, rows: &[CsvRow], profile: &CsvProfile) -> Result<Vec<ExpenseRecord>> {
        let mut records = Vec::with_capacity(rows.len());

        for (line, row) in rows {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let record = parse_row(row, profile)
                .map_err(|e| Error::malformed(path, *line, e))?;
            records.push(record);
        }

        Ok(records)
    }
}

fn parse_row(row: &[String], profile: &CsvProfile) -> std::result::Result<ExpenseRecord, ParseError> {
    let field = |col: usize| row.get(col).map(|s| s.trim()).unwrap_or("");
    let optional = |col: Option<usize>| {
        col.map(field)
            .filter(|s| !is_sentinel(s))
            .map(str::to_string)
    };

    let date = parse_date(field(profile.date_column))?;
    let amount = parse_decimal(field(profile.amount_column))?;

    Ok(ExpenseRecord {
        date,
        store: field(profile.store_column).to_string(),
        category: field(profile.category_column).to_string(),
        subcategory: field(profile.subcategory_column).to_string(),
        amount,
        reference: optional(profile.reference_column),
        note: optional(profile.note_column),
    })
}

/// Parse an import date. Spreadsheet exports may carry a midnight time part.
pub(crate) fn parse_date(s: &str) -> std::result::Result<NaiveDate, ParseError> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(ParseError::InvalidDate(s.to_string()))
}

/// Parse an amount such as `12.50`, `12,50 DH` or `1 234.50 MAD`.
pub(crate) fn parse_decimal(s: &str) -> std::result::Result<Decimal, ParseError> {
    let mut cleaned: String = strip_currency(s.trim())
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '"')
        .collect();
    if cleaned.contains(',') {
        cleaned = if cleaned.contains('.') {
            cleaned.replace(',', "")
        } else {
            cleaned.replace(',', ".")
        };
    }
    if cleaned.is_empty() {
        return Err(ParseError::InvalidAmount(s.trim().to_string()));
    }
    Decimal::from_str(&cleaned).map_err(|_| ParseError::InvalidAmount(s.trim().to_string()))
}

/// Drop a trailing `MAD`/`DH` label, whatever its case.
fn strip_currency(s: &str) -> &str {
    for label in ["MAD", "DH"] {
        let Some(cut) = s.len().checked_sub(label.len()) else {
            continue;
        };
        if let (Some(head), Some(tail)) = (s.get(..cut), s.get(cut..)) {
            if tail.eq_ignore_ascii_case(label) {
                return head;
            }
        }
    }
    s
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
