#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;
use std::io::Write;

fn make_csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── parse_decimal ─────────────────────────────────────────────

#[test]
fn test_parse_decimal_basic() {
    assert_eq!(parse_decimal("100.50").unwrap(), dec!(100.50));
    assert_eq!(parse_decimal("42").unwrap(), dec!(42));
}

#[test]
fn test_parse_decimal_keeps_scale() {
    assert_eq!(parse_decimal("12.50").unwrap().to_string(), "12.50");
}

#[test]
fn test_parse_decimal_with_currency() {
    assert_eq!(parse_decimal("12.50 DH").unwrap(), dec!(12.50));
    assert_eq!(parse_decimal("1 234.50 MAD").unwrap(), dec!(1234.50));
}

#[test]
fn test_parse_decimal_currency_any_case() {
    assert_eq!(parse_decimal("12,50 dh").unwrap(), dec!(12.50));
    assert_eq!(parse_decimal("3 Mad").unwrap(), dec!(3));
    assert_eq!(parse_decimal("7.25Dh").unwrap(), dec!(7.25));
    assert!(parse_decimal("dh").is_err());
}

#[test]
fn test_parse_decimal_comma() {
    assert_eq!(parse_decimal("12,50").unwrap(), dec!(12.50));
    assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
}

#[test]
fn test_parse_decimal_quoted() {
    assert_eq!(parse_decimal("\"100.00\"").unwrap(), dec!(100.00));
}

#[test]
fn test_parse_decimal_invalid() {
    assert!(parse_decimal("not_a_number").is_err());
    assert!(parse_decimal("").is_err());
    assert!(parse_decimal(" DH").is_err());
}

// ── parse_date ────────────────────────────────────────────────

#[test]
fn test_parse_date_iso() {
    assert_eq!(parse_date("2024-03-05").unwrap(), ymd(2024, 3, 5));
}

#[test]
fn test_parse_date_with_time_part() {
    assert_eq!(parse_date("2024-03-05 00:00:00").unwrap(), ymd(2024, 3, 5));
    assert_eq!(parse_date("2024-03-05T00:00:00").unwrap(), ymd(2024, 3, 5));
}

#[test]
fn test_parse_date_day_first() {
    assert_eq!(parse_date("05/03/2024").unwrap(), ymd(2024, 3, 5));
}

#[test]
fn test_parse_date_invalid() {
    assert_eq!(
        parse_date("yesterday").unwrap_err(),
        ParseError::InvalidDate("yesterday".into())
    );
    assert!(parse_date("2024-02-30").is_err());
}

// ── read ──────────────────────────────────────────────────────

#[test]
fn test_read_canonical() {
    let file = make_csv_file(
        "Date,Store,Category,Subcategory,Amount,Reference,Note\n\
         2024-03-05,Marché A,Fruits,Bananes,12.50,,bio\n\
         2024-03-06,Marjane,Légumes,Tomates,7.30,T-42,\n",
    );
    let records = CsvImporter::read(file.path()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0],
        ExpenseRecord::new(ymd(2024, 3, 5), "Marché A", "Fruits", "Bananes", dec!(12.50))
            .with_note("bio")
    );
    assert_eq!(records[1].reference.as_deref(), Some("T-42"));
    assert_eq!(records[1].note, None);
}

#[test]
fn test_read_legacy_export() {
    let file = make_csv_file(
        "Date,Catégorie,Sous-catégorie,Magasin,Montant (DH),Note\n\
         2024-03-05 00:00:00,Fruits,Bananes,Marché A,12.5,nan\n\
         2024-03-07 00:00:00,Légumes,Tomates,Marjane,0.0,\n",
    );
    let records = CsvImporter::read(file.path()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].store, "Marché A");
    assert_eq!(records[0].category, "Fruits");
    assert_eq!(records[0].amount, dec!(12.5));
    assert_eq!(records[0].note, None);
    assert_eq!(records[1].amount, Decimal::ZERO);
}

#[test]
fn test_read_skips_blank_rows() {
    let file = make_csv_file(
        "Date,Store,Category,Subcategory,Amount\n\
         2024-03-05,Marché A,Fruits,Bananes,1\n\
         ,,,,\n",
    );
    assert_eq!(CsvImporter::read(file.path()).unwrap().len(), 1);
}

#[test]
fn test_read_unknown_header() {
    let file = make_csv_file("Posted,Payee,Amount\n2024-03-05,Shop,1\n");
    let err = CsvImporter::read(file.path()).unwrap_err();
    assert!(matches!(err, Error::MalformedSource { line: 1, .. }));
}

#[test]
fn test_read_bad_row_reports_line() {
    let file = make_csv_file(
        "Date,Store,Category,Subcategory,Amount\n\
         2024-03-05,Marché A,Fruits,Bananes,1\n\
         2024-03-06,Marché A,Fruits,Bananes,abc\n",
    );
    let err = CsvImporter::read(file.path()).unwrap_err();
    assert!(matches!(err, Error::MalformedSource { line: 3, .. }));
    assert!(err.to_string().contains("'abc'"));
}

#[test]
fn test_read_empty_file() {
    let file = make_csv_file("");
    assert!(matches!(
        CsvImporter::read(file.path()).unwrap_err(),
        Error::MalformedSource { .. }
    ));
}

#[test]
fn test_read_missing_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = CsvImporter::read(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }));
}
