//! Loads the category / sub-category / store reference from a CSV export of
//! the reference spreadsheet.
//!
//! Two source shapes are understood:
//!
//! * **Tabular**: after `skip_rows` leading rows, column `category_column`
//!   holds the category and the two columns after it hold the sub-category
//!   and the store.
//! * **Sparse**: a row with only a first-column value opens a category; a row
//!   with an empty first column and a second-column value adds a
//!   sub-category to the open category. An optional third column lists stores.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{is_sentinel, Taxonomy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabularLayout {
    pub skip_rows: usize,
    pub category_column: usize,
}

impl Default for TabularLayout {
    fn default() -> Self {
        Self {
            skip_rows: 2,
            category_column: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyFormat {
    /// Tabular when the rows after the layout's skipped rows fill its
    /// columns, sparse otherwise.
    Auto(TabularLayout),
    Tabular(TabularLayout),
    Sparse,
}

impl Default for TaxonomyFormat {
    fn default() -> Self {
        Self::Tabular(TabularLayout::default())
    }
}

impl TaxonomyFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Some(Self::Auto(TabularLayout::default())),
            "tabular" | "table" => Some(Self::Tabular(TabularLayout::default())),
            "sparse" | "blocks" => Some(Self::Sparse),
            _ => None,
        }
    }

    pub fn with_layout(self, layout: TabularLayout) -> Self {
        match self {
            Self::Auto(_) => Self::Auto(layout),
            Self::Tabular(_) => Self::Tabular(layout),
            Self::Sparse => Self::Sparse,
        }
    }

    /// The tabular layout, unless the format is sparse.
    pub fn layout(self) -> Option<TabularLayout> {
        match self {
            Self::Auto(layout) | Self::Tabular(layout) => Some(layout),
            Self::Sparse => None,
        }
    }
}

/// A source row with the 1-based line it was read from.
pub(crate) type SourceRow = (u64, Vec<String>);

/// Read and parse the taxonomy source at `path`.
///
/// Fails with [`Error::SourceUnavailable`] when the file is missing,
/// unreadable or yields no category, and with [`Error::MalformedSource`] when
/// a sparse source lists a sub-category before any category.
pub fn load(path: &Path, format: TaxonomyFormat) -> Result<Taxonomy> {
    if !path.exists() {
        return Err(Error::unavailable(path, "file not found"));
    }
    let rows = read_rows(path)?;
    let taxonomy = parse_rows(path, &rows, format)?;

    if taxonomy.is_empty() {
        return Err(Error::unavailable(path, "no categories found"));
    }

    let dropped: Vec<&str> = taxonomy
        .entries()
        .iter()
        .filter(|e| e.subcategories.is_empty())
        .map(|e| e.category.as_str())
        .collect();
    if !dropped.is_empty() {
        warn!(
            categories = ?dropped,
            "Categories without sub-categories will not be offered for entry"
        );
    }
    info!(
        path = %path.display(),
        categories = taxonomy.entries().len(),
        stores = taxonomy.stores().len(),
        "Loaded taxonomy"
    );
    Ok(taxonomy)
}

fn read_rows(path: &Path) -> Result<Vec<SourceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .map_err(|e| Error::unavailable(path, e))?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| Error::unavailable(path, e))?;
        let line = record.position().map_or(rows.len() as u64 + 1, |p| p.line());
        rows.push((line, record.iter().map(|s| s.to_string()).collect()));
    }
    Ok(rows)
}

pub(crate) fn parse_rows(path: &Path, rows: &[SourceRow], format: TaxonomyFormat) -> Result<Taxonomy> {
    match format {
        TaxonomyFormat::Tabular(layout) => Ok(parse_tabular(rows, layout)),
        TaxonomyFormat::Sparse => parse_sparse(path, rows),
        TaxonomyFormat::Auto(layout) => {
            if looks_tabular(rows, layout) {
                debug!("Detected tabular taxonomy source");
                Ok(parse_tabular(rows, layout))
            } else {
                debug!("Detected sparse taxonomy source");
                parse_sparse(path, rows)
            }
        }
    }
}

/// A sparse source fills at most three columns, and only rarely fills every
/// cell up to the sub-category column of `layout` on the same row.
pub(crate) fn looks_tabular(rows: &[SourceRow], layout: TabularLayout) -> bool {
    let col = layout.category_column;
    let data: Vec<&[String]> = rows
        .iter()
        .skip(layout.skip_rows)
        .map(|(_, row)| row.as_slice())
        .collect();

    let past_sub = (col + 2).max(3);
    if data
        .iter()
        .any(|row| row.iter().skip(past_sub).any(|c| !is_sentinel(c)))
    {
        return true;
    }

    let named: Vec<&[String]> = data
        .iter()
        .copied()
        .filter(|row| !is_sentinel(cell(row, col)) || !is_sentinel(cell(row, col + 1)))
        .collect();
    let full = named
        .iter()
        .filter(|row| (0..=col + 1).all(|i| !is_sentinel(cell(row, i))))
        .count();
    !named.is_empty() && full * 2 > named.len()
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.as_str()).unwrap_or("")
}

fn parse_tabular(rows: &[SourceRow], layout: TabularLayout) -> Taxonomy {
    let mut builder = Taxonomy::builder();
    let col = layout.category_column;

    for (_, row) in rows.iter().skip(layout.skip_rows) {
        let category = cell(row, col);
        let subcategory = cell(row, col + 1);
        let store = cell(row, col + 2);

        if is_sentinel(category) && is_sentinel(subcategory) && is_sentinel(store) {
            continue;
        }
        if let Some(idx) = builder.category(category) {
            builder.subcategory(idx, subcategory);
        }
        builder.store(store);
    }
    builder.build()
}

fn parse_sparse(path: &Path, rows: &[SourceRow]) -> Result<Taxonomy> {
    let mut builder = Taxonomy::builder();
    let mut current: Option<usize> = None;

    for (line, row) in rows {
        let first = cell(row, 0);
        let second = cell(row, 1);
        builder.store(cell(row, 2));

        if !is_sentinel(first) {
            current = builder.category(first);
            if let Some(idx) = current {
                builder.subcategory(idx, second);
            }
        } else if !is_sentinel(second) {
            let idx = current.ok_or_else(|| {
                Error::malformed(
                    path,
                    *line,
                    format!("sub-category '{}' appears before any category", second.trim()),
                )
            })?;
            builder.subcategory(idx, second);
        }
    }
    Ok(builder.build())
}
