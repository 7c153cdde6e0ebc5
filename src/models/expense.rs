use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::MonthKey;

/// A single grocery purchase. Records are immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    pub date: NaiveDate,
    pub store: String,
    pub category: String,
    pub subcategory: String,
    pub amount: Decimal,
    pub reference: Option<String>,
    pub note: Option<String>,
}

impl ExpenseRecord {
    pub fn new(
        date: NaiveDate,
        store: impl Into<String>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            date,
            store: store.into(),
            category: category.into(),
            subcategory: subcategory.into(),
            amount,
            reference: None,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }

    /// Trim every text field; blank optional fields become `None`.
    pub fn normalized(self) -> Self {
        Self {
            date: self.date,
            store: self.store.trim().to_string(),
            category: self.category.trim().to_string(),
            subcategory: self.subcategory.trim().to_string(),
            amount: self.amount,
            reference: non_blank(self.reference),
            note: non_blank(self.note),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A record paired with its 1-based display position. The position is not
/// stored; it is recomputed from insertion order on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedExpense {
    pub position: usize,
    pub record: ExpenseRecord,
}
