/// Column positions of one CSV dialect, resolved from its header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CsvProfile {
    pub(crate) name: &'static str,
    pub(crate) date_column: usize,
    pub(crate) store_column: usize,
    pub(crate) category_column: usize,
    pub(crate) subcategory_column: usize,
    pub(crate) amount_column: usize,
    pub(crate) reference_column: Option<usize>,
    pub(crate) note_column: Option<usize>,
}

pub(crate) const CANONICAL_HEADERS: [&str; 7] = [
    "Date",
    "Store",
    "Category",
    "Subcategory",
    "Amount",
    "Reference",
    "Note",
];

/// Map a header row onto a known dialect. Returns None when the required
/// columns are not all present.
pub(crate) fn detect_dialect(headers: &[String]) -> Option<CsvProfile> {
    let h: Vec<String> = headers
        .iter()
        .map(|s| s.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();

    // Canonical export: Date,Store,Category,Subcategory,Amount[,Reference][,Note]
    if let (Some(date), Some(store), Some(category), Some(subcategory), Some(amount)) = (
        col_index(&h, &["date"]),
        col_index(&h, &["store"]),
        col_index(&h, &["category"]),
        col_index(&h, &["subcategory", "sub-category"]),
        col_index(&h, &["amount"]),
    ) {
        return Some(CsvProfile {
            name: "Canonical",
            date_column: date,
            store_column: store,
            category_column: category,
            subcategory_column: subcategory,
            amount_column: amount,
            reference_column: col_index(&h, &["reference"]),
            note_column: col_index(&h, &["note"]),
        });
    }

    // Legacy export: Date,Catégorie,Sous-catégorie,Magasin,Montant (DH)[,Référence],Note
    if let (Some(date), Some(store), Some(category), Some(subcategory), Some(amount)) = (
        col_index(&h, &["date"]),
        col_index(&h, &["magasin"]),
        col_index(&h, &["catégorie", "categorie"]),
        col_index(&h, &["sous-catégorie", "sous-categorie"]),
        col_index(&h, &["montant (dh)", "montant (mad)", "montant"]),
    ) {
        return Some(CsvProfile {
            name: "Legacy",
            date_column: date,
            store_column: store,
            category_column: category,
            subcategory_column: subcategory,
            amount_column: amount,
            reference_column: col_index(&h, &["référence", "reference"]),
            note_column: col_index(&h, &["note"]),
        });
    }

    None
}

fn col_index(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| names.contains(&h.as_str()))
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
