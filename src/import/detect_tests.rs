#![allow(clippy::unwrap_used)]

use super::*;

fn h(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_detect_canonical() {
    let profile = detect_dialect(&h(&CANONICAL_HEADERS)).unwrap();
    assert_eq!(profile.name, "Canonical");
    assert_eq!(profile.date_column, 0);
    assert_eq!(profile.store_column, 1);
    assert_eq!(profile.category_column, 2);
    assert_eq!(profile.subcategory_column, 3);
    assert_eq!(profile.amount_column, 4);
    assert_eq!(profile.reference_column, Some(5));
    assert_eq!(profile.note_column, Some(6));
}

#[test]
fn test_detect_canonical_reordered_without_optionals() {
    let profile = detect_dialect(&h(&["amount", "DATE", "Category", "Subcategory", "Store"])).unwrap();
    assert_eq!(profile.amount_column, 0);
    assert_eq!(profile.date_column, 1);
    assert_eq!(profile.store_column, 4);
    assert_eq!(profile.reference_column, None);
    assert_eq!(profile.note_column, None);
}

#[test]
fn test_detect_legacy() {
    let headers = h(&[
        "Date",
        "Catégorie",
        "Sous-catégorie",
        "Magasin",
        "Montant (DH)",
        "Note",
    ]);
    let profile = detect_dialect(&headers).unwrap();
    assert_eq!(profile.name, "Legacy");
    assert_eq!(profile.category_column, 1);
    assert_eq!(profile.subcategory_column, 2);
    assert_eq!(profile.store_column, 3);
    assert_eq!(profile.amount_column, 4);
    assert_eq!(profile.reference_column, None);
    assert_eq!(profile.note_column, Some(5));
}

#[test]
fn test_detect_legacy_with_reference() {
    let headers = h(&[
        "Date",
        "Catégorie",
        "Sous-catégorie",
        "Magasin",
        "Montant (DH)",
        "Référence",
        "Note",
    ]);
    let profile = detect_dialect(&headers).unwrap();
    assert_eq!(profile.reference_column, Some(5));
    assert_eq!(profile.note_column, Some(6));
}

#[test]
fn test_detect_strips_bom() {
    let mut headers = h(&CANONICAL_HEADERS);
    headers[0] = "\u{feff}Date".into();
    assert_eq!(detect_dialect(&headers).unwrap().date_column, 0);
}

#[test]
fn test_detect_unknown_header() {
    assert!(detect_dialect(&h(&["Date", "Description", "Amount"])).is_none());
    assert!(detect_dialect(&h(&["2024-03-05", "Marché A", "Fruits", "Bananes", "12.50"])).is_none());
    assert!(detect_dialect(&[]).is_none());
}
