//! Budget limits and alert evaluation.
//!
//! An alert is a plain value. How (and whether) it is shown is up to the
//! caller.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::aggregate;
use crate::error::ValidationError;
use crate::models::{Budget, BudgetScope, ExpenseRecord};

/// The configured limits: an optional total plus per-category limits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetBook {
    total: Option<Decimal>,
    categories: BTreeMap<String, Decimal>,
}

impl BudgetBook {
    pub fn from_budgets(budgets: impl IntoIterator<Item = Budget>) -> Self {
        let mut book = Self::default();
        for budget in budgets {
            book.insert(budget.scope, budget.limit);
        }
        book
    }

    /// Set or replace the limit for `scope`.
    pub fn set(&mut self, scope: BudgetScope, limit: Decimal) -> Result<(), ValidationError> {
        if limit < Decimal::ZERO {
            return Err(ValidationError::InvalidBudget(limit));
        }
        self.insert(scope, limit);
        Ok(())
    }

    fn insert(&mut self, scope: BudgetScope, limit: Decimal) {
        match scope {
            BudgetScope::Total => self.total = Some(limit),
            BudgetScope::Category(name) => {
                self.categories.insert(name, limit);
            }
        }
    }

    pub fn remove(&mut self, scope: &BudgetScope) -> Option<Decimal> {
        match scope {
            BudgetScope::Total => self.total.take(),
            BudgetScope::Category(name) => self.categories.remove(name),
        }
    }

    pub fn total(&self) -> Option<Decimal> {
        self.total
    }

    pub fn category(&self, name: &str) -> Option<Decimal> {
        self.categories.get(name).copied()
    }

    pub fn get(&self, scope: &BudgetScope) -> Option<Decimal> {
        match scope {
            BudgetScope::Total => self.total,
            BudgetScope::Category(name) => self.category(name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_none() && self.categories.is_empty()
    }

    /// All limits, the total first, then categories by name.
    pub fn budgets(&self) -> Vec<Budget> {
        self.total
            .map(|limit| Budget::new(BudgetScope::Total, limit))
            .into_iter()
            .chain(
                self.categories
                    .iter()
                    .map(|(name, &limit)| Budget::new(BudgetScope::Category(name.clone()), limit)),
            )
            .collect()
    }

    pub fn evaluate(&self, month_records: &[ExpenseRecord]) -> AlertSet {
        evaluate(month_records, self.total, &self.categories)
    }
}

/// Spend over a configured limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub scope: BudgetScope,
    pub spent: Decimal,
    pub limit: Decimal,
}

impl Alert {
    pub fn overspend(&self) -> Decimal {
        self.spent - self.limit
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertSet {
    alerts: Vec<Alert>,
}

impl AlertSet {
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Alert> {
        self.alerts.iter()
    }

    pub fn total(&self) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.scope == BudgetScope::Total)
    }

    pub fn category(&self, name: &str) -> Option<&Alert> {
        self.alerts
            .iter()
            .find(|a| a.scope.category() == Some(name))
    }
}

impl IntoIterator for AlertSet {
    type Item = Alert;
    type IntoIter = std::vec::IntoIter<Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.alerts.into_iter()
    }
}

impl<'a> IntoIterator for &'a AlertSet {
    type Item = &'a Alert;
    type IntoIter = std::slice::Iter<'a, Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.alerts.iter()
    }
}

/// Compare one month of spending against the limits.
///
/// A limit only fires when it is greater than zero and spend is strictly
/// above it. Categories with spend but no limit never alert.
pub fn evaluate(
    month_records: &[ExpenseRecord],
    total_budget: Option<Decimal>,
    category_budgets: &BTreeMap<String, Decimal>,
) -> AlertSet {
    let mut alerts = Vec::new();

    if let Some(limit) = total_budget.filter(|l| *l > Decimal::ZERO) {
        let spent = aggregate::total(month_records);
        if spent > limit {
            alerts.push(Alert {
                scope: BudgetScope::Total,
                spent,
                limit,
            });
        }
    }

    let mut category_alerts: Vec<Alert> = aggregate::by_category(month_records)
        .into_iter()
        .filter_map(|c| {
            let limit = category_budgets
                .get(&c.category)
                .copied()
                .filter(|l| *l > Decimal::ZERO)?;
            (c.total > limit).then(|| Alert {
                scope: BudgetScope::Category(c.category),
                spent: c.total,
                limit,
            })
        })
        .collect();
    category_alerts.sort_by(|a, b| a.scope.cmp(&b.scope));
    alerts.extend(category_alerts);

    AlertSet { alerts }
}
