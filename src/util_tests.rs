#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("Bananes", 10), "Bananes");
    assert_eq!(truncate("Bananes", 7), "Bananes");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("Produits laitiers", 9), "Produits…");
}

#[test]
fn test_truncate_accented() {
    assert_eq!(truncate("Épicerie fine", 5), "Épic…");
}

#[test]
fn test_truncate_edges() {
    assert_eq!(truncate("", 5), "");
    assert_eq!(truncate("hello", 0), "");
    assert_eq!(truncate("hello", 1), "…");
}

// ── format_amount ─────────────────────────────────────────────

#[test]
fn test_format_amount_basic() {
    assert_eq!(format_amount(dec!(1234.56), "MAD"), "1,234.56 MAD");
    assert_eq!(format_amount(dec!(999.99), "MAD"), "999.99 MAD");
}

#[test]
fn test_format_amount_zero() {
    assert_eq!(format_amount(dec!(0), "MAD"), "0.00 MAD");
}

#[test]
fn test_format_amount_pads_and_rounds() {
    assert_eq!(format_amount(dec!(12.5), "MAD"), "12.50 MAD");
    assert_eq!(format_amount(dec!(0.125), "MAD"), "0.13 MAD");
}

#[test]
fn test_format_amount_large() {
    assert_eq!(format_amount(dec!(10000000.00), "DH"), "10,000,000.00 DH");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(dec!(-2.50), "MAD"), "-2.50 MAD");
}

#[test]
fn test_format_amount_without_label() {
    assert_eq!(format_amount(dec!(1234.5), ""), "1,234.50");
}
