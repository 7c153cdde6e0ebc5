//! Spending summaries over a ledger snapshot. All functions are pure.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::{ExpenseRecord, MonthKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTotal {
    pub month: MonthKey,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryTotal {
    pub category: String,
    pub subcategory: String,
    pub total: Decimal,
}

/// Sum of every amount. Saturates at `Decimal::MAX` instead of overflowing,
/// so rows written before amounts were bounded cannot abort a summary.
pub fn total(records: &[ExpenseRecord]) -> Decimal {
    records
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.amount))
}

fn accumulate<K: Ord>(totals: &mut BTreeMap<K, Decimal>, key: K, amount: Decimal) {
    let slot = totals.entry(key).or_default();
    *slot = slot.saturating_add(amount);
}

/// Monthly sums, oldest month first.
pub fn by_month(records: &[ExpenseRecord]) -> Vec<MonthTotal> {
    let mut totals: BTreeMap<MonthKey, Decimal> = BTreeMap::new();
    for record in records {
        accumulate(&mut totals, record.month(), record.amount);
    }
    totals
        .into_iter()
        .map(|(month, total)| MonthTotal { month, total })
        .collect()
}

/// Category sums, largest first; equal sums are ordered by name.
pub fn by_category(records: &[ExpenseRecord]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for record in records {
        accumulate(&mut totals, record.category.as_str(), record.amount);
    }
    let mut result: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    result.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    result
}

/// Sums per (category, sub-category), ordered by category then sub-category.
pub fn by_category_and_subcategory(records: &[ExpenseRecord]) -> Vec<SubcategoryTotal> {
    let mut totals: BTreeMap<(&str, &str), Decimal> = BTreeMap::new();
    for record in records {
        accumulate(
            &mut totals,
            (record.category.as_str(), record.subcategory.as_str()),
            record.amount,
        );
    }
    totals
        .into_iter()
        .map(|((category, subcategory), total)| SubcategoryTotal {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            total,
        })
        .collect()
}

pub fn filter_by_month(records: &[ExpenseRecord], month: MonthKey) -> Vec<ExpenseRecord> {
    records
        .iter()
        .filter(|r| month.contains(r.date))
        .cloned()
        .collect()
}
