/// A category and its sub-categories in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub category: String,
    pub subcategories: Vec<String>,
}

/// The category -> sub-category mapping plus the store list that constrain
/// data entry. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
    stores: Vec<String>,
}

impl Taxonomy {
    pub fn builder() -> TaxonomyBuilder {
        TaxonomyBuilder::default()
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    /// Categories that can be offered on an entry form (at least one sub-category).
    pub fn offered(&self) -> impl Iterator<Item = &TaxonomyEntry> {
        self.entries.iter().filter(|e| !e.subcategories.is_empty())
    }

    pub fn stores(&self) -> &[String] {
        &self.stores
    }

    pub fn find(&self, category: &str) -> Option<&TaxonomyEntry> {
        self.entries.iter().find(|e| e.category == category)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.find(category).is_some()
    }

    pub fn subcategories(&self, category: &str) -> Option<&[String]> {
        self.find(category).map(|e| e.subcategories.as_slice())
    }

    pub fn contains(&self, category: &str, subcategory: &str) -> bool {
        self.find(category)
            .is_some_and(|e| e.subcategories.iter().any(|s| s == subcategory))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// True for the placeholder cells a spreadsheet export leaves behind.
pub fn is_sentinel(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

/// Accumulates categories, sub-categories and stores while deduplicating.
#[derive(Debug, Default)]
pub struct TaxonomyBuilder {
    entries: Vec<TaxonomyEntry>,
    stores: Vec<String>,
}

impl TaxonomyBuilder {
    /// Open `category`, creating it on first sight. Returns its index, or
    /// `None` when the name is a sentinel.
    pub fn category(&mut self, category: &str) -> Option<usize> {
        if is_sentinel(category) {
            return None;
        }
        let name = category.trim();
        if let Some(idx) = self.entries.iter().position(|e| e.category == name) {
            return Some(idx);
        }
        self.entries.push(TaxonomyEntry {
            category: name.to_string(),
            subcategories: Vec::new(),
        });
        Some(self.entries.len() - 1)
    }

    pub fn subcategory(&mut self, category_idx: usize, subcategory: &str) {
        if is_sentinel(subcategory) {
            return;
        }
        let name = subcategory.trim();
        if let Some(entry) = self.entries.get_mut(category_idx) {
            if !entry.subcategories.iter().any(|s| s == name) {
                entry.subcategories.push(name.to_string());
            }
        }
    }

    pub fn store(&mut self, store: &str) {
        if is_sentinel(store) {
            return;
        }
        let name = store.trim();
        if !self.stores.iter().any(|s| s == name) {
            self.stores.push(name.to_string());
        }
    }

    pub fn build(mut self) -> Taxonomy {
        self.stores.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
        Taxonomy {
            entries: self.entries,
            stores: self.stores,
        }
    }
}
