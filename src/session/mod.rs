//! The session context: one taxonomy snapshot, one ledger, one set of
//! budgets. Everything a front end needs goes through [`Session`].
//!
//! Mutating calls take `&mut self`, so a session has a single writer by
//! construction. Callers sharing one across threads wrap it in a `Mutex`.

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use crate::aggregate::{self, CategoryTotal, MonthTotal, SubcategoryTotal};
use crate::budget::{AlertSet, BudgetBook};
use crate::config::Config;
use crate::error::{Result, ValidationError};
use crate::export;
use crate::import::{self, ImportMode};
use crate::ledger::{AmountPolicy, Ledger, LedgerSnapshot};
use crate::models::{Budget, BudgetScope, ExpenseRecord, IndexedExpense, MonthKey, Taxonomy};
use crate::taxonomy;

pub struct Session {
    config: Config,
    taxonomy: Taxonomy,
    ledger: Ledger,
    budgets: BudgetBook,
}

impl Session {
    /// Load the taxonomy and open the ledger. A missing or unreadable
    /// taxonomy is fatal.
    pub fn open(config: Config) -> Result<Self> {
        let taxonomy = taxonomy::load(config.taxonomy_path(), config.taxonomy_format())?;
        config.ensure_dirs()?;
        let ledger = Ledger::open(config.db_path())?;
        Self::with_parts(config, taxonomy, ledger)
    }

    pub(crate) fn with_parts(config: Config, taxonomy: Taxonomy, ledger: Ledger) -> Result<Self> {
        let budgets = BudgetBook::from_budgets(ledger.budgets()?);
        Ok(Self {
            config,
            taxonomy,
            ledger,
            budgets,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Re-read the taxonomy source. On failure the current taxonomy is kept.
    pub fn refresh_taxonomy(&mut self) -> Result<&Taxonomy> {
        self.taxonomy = taxonomy::load(self.config.taxonomy_path(), self.config.taxonomy_format())?;
        Ok(&self.taxonomy)
    }

    // ── Ledger ────────────────────────────────────────────────

    /// Validate and append one manually entered purchase.
    pub fn add_expense(&mut self, record: ExpenseRecord) -> Result<()> {
        self.ledger
            .append(&self.taxonomy, record, AmountPolicy::Positive)
    }

    pub fn list_expenses(&self) -> Result<Vec<IndexedExpense>> {
        self.ledger.all()
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        self.ledger.snapshot()
    }

    /// Delete the records at the given 1-based positions, all or none.
    pub fn delete_expenses(&mut self, positions: &BTreeSet<usize>) -> Result<usize> {
        self.ledger.delete_by_positions(positions)
    }

    pub fn clear_all(&mut self) -> Result<usize> {
        self.ledger.clear()
    }

    /// Re-read the ledger and budgets from disk.
    pub fn reload(&mut self) -> Result<LedgerSnapshot> {
        self.budgets = BudgetBook::from_budgets(self.ledger.budgets()?);
        self.ledger.reload()
    }

    // ── Aggregation ───────────────────────────────────────────

    pub fn aggregate_by_month(&self) -> Result<Vec<MonthTotal>> {
        Ok(aggregate::by_month(self.snapshot()?.records()))
    }

    pub fn aggregate_by_category(&self, month: Option<MonthKey>) -> Result<Vec<CategoryTotal>> {
        Ok(aggregate::by_category(&self.records_for(month)?))
    }

    pub fn aggregate_by_subcategory(&self, month: Option<MonthKey>) -> Result<Vec<SubcategoryTotal>> {
        Ok(aggregate::by_category_and_subcategory(&self.records_for(month)?))
    }

    pub fn month_expenses(&self, month: MonthKey) -> Result<Vec<ExpenseRecord>> {
        Ok(aggregate::filter_by_month(self.snapshot()?.records(), month))
    }

    fn records_for(&self, month: Option<MonthKey>) -> Result<Vec<ExpenseRecord>> {
        let snapshot = self.snapshot()?;
        Ok(match month {
            Some(month) => aggregate::filter_by_month(snapshot.records(), month),
            None => snapshot.records().to_vec(),
        })
    }

    // ── Budgets ───────────────────────────────────────────────

    /// Set or replace a limit. Category limits must name a known category.
    pub fn set_budget(&mut self, scope: BudgetScope, limit: Decimal) -> Result<()> {
        if let Some(category) = scope.category() {
            if !self.taxonomy.has_category(category) {
                return Err(ValidationError::InvalidCategory(category.to_string()).into());
            }
        }
        let mut budgets = self.budgets.clone();
        budgets.set(scope.clone(), limit)?;
        self.ledger.save_budget(&Budget::new(scope.clone(), limit))?;
        self.budgets = budgets;
        info!(%scope, %limit, "Set budget");
        Ok(())
    }

    /// Returns false when no limit was set for `scope`.
    pub fn remove_budget(&mut self, scope: &BudgetScope) -> Result<bool> {
        let removed = self.ledger.remove_budget(scope)?;
        self.budgets.remove(scope);
        if removed {
            info!(%scope, "Removed budget");
        }
        Ok(removed)
    }

    pub fn budgets(&self) -> Vec<Budget> {
        self.budgets.budgets()
    }

    pub fn check_alerts(&self, month: MonthKey) -> Result<AlertSet> {
        let records = self.month_expenses(month)?;
        let alerts = self.budgets.evaluate(&records);
        if !alerts.is_empty() {
            warn!(%month, alerts = alerts.len(), "Budget exceeded");
        }
        Ok(alerts)
    }

    // ── Import / export ───────────────────────────────────────

    /// Write the history, or one month of it, as canonical CSV.
    pub fn export_csv<W: Write>(&self, writer: W, month: Option<MonthKey>) -> Result<usize> {
        let records = self.records_for(month)?;
        export::write_csv(writer, &records)
    }

    /// Import a CSV file. Every row must map and validate or nothing is
    /// written.
    pub fn import_csv(&mut self, path: &Path, mode: ImportMode) -> Result<usize> {
        let records = import::read_file(path)?;
        let policy = self.config.import_policy();
        let count = match mode {
            ImportMode::Append => self.ledger.append_all(&self.taxonomy, records, policy),
            ImportMode::Replace => self.ledger.replace_all(&self.taxonomy, records, policy),
        }?;
        info!(path = %path.display(), count, ?mode, "Imported expenses");
        Ok(count)
    }
}

#[cfg(test)]
mod tests;
