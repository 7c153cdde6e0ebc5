//! The ledger store: the single owner of expense records.
//!
//! Reads go through a [`LedgerSnapshot`], an immutable view tagged with the
//! generation it was taken at. Every mutation bumps the generation and drops
//! the cached snapshot, so the next read sees the committed state.

use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{ParseError, Result, ValidationError};
use crate::models::{Budget, BudgetScope, ExpenseRecord, IndexedExpense, Taxonomy};

/// Which amounts a write path accepts. Negative amounts are always rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmountPolicy {
    /// Amount must be greater than zero (manual entry).
    #[default]
    Positive,
    /// Zero is allowed (imports of legacy data).
    NonNegative,
}

/// Largest amount a single record may carry. Keeps every ledger sum far
/// below `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Decimal places a record amount may carry.
pub const AMOUNT_SCALE: u32 = 2;

impl AmountPolicy {
    pub fn check(self, amount: Decimal) -> std::result::Result<(), ValidationError> {
        let sign_ok = match self {
            Self::Positive => amount > Decimal::ZERO,
            Self::NonNegative => amount >= Decimal::ZERO,
        };
        if sign_ok && amount <= MAX_AMOUNT && amount.normalize().scale() <= AMOUNT_SCALE {
            Ok(())
        } else {
            Err(ValidationError::InvalidAmount(amount))
        }
    }
}

/// Normalize `record` and check it against `taxonomy` and `policy`.
pub fn validate_record(
    taxonomy: &Taxonomy,
    record: ExpenseRecord,
    policy: AmountPolicy,
) -> std::result::Result<ExpenseRecord, ValidationError> {
    let record = record.normalized();

    let subcategories = taxonomy
        .subcategories(&record.category)
        .ok_or_else(|| ValidationError::InvalidCategory(record.category.clone()))?;
    if !subcategories.iter().any(|s| *s == record.subcategory) {
        return Err(ValidationError::InvalidSubcategory {
            category: record.category.clone(),
            subcategory: record.subcategory.clone(),
        });
    }
    if record.store.is_empty() {
        return Err(ValidationError::MissingStore);
    }
    policy.check(record.amount)?;
    Ok(record)
}

/// Parse a user-typed position list such as `"1, 3 5"`.
pub fn parse_positions(input: &str) -> std::result::Result<BTreeSet<usize>, ParseError> {
    let mut positions = BTreeSet::new();
    for token in input
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let position = token
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidInput(format!("'{token}' is not a position")))?;
        positions.insert(position);
    }
    if positions.is_empty() {
        return Err(ParseError::InvalidInput("no positions given".into()));
    }
    Ok(positions)
}

/// Parse a user-typed amount such as `12.50` or `12,50 DH`.
pub fn parse_amount(input: &str) -> std::result::Result<Decimal, ParseError> {
    crate::import::parse_decimal(input)
}

/// An immutable view of the ledger at one generation.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    generation: u64,
    records: Arc<[ExpenseRecord]>,
}

impl LedgerSnapshot {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with their 1-based display positions.
    pub fn indexed(&self) -> Vec<IndexedExpense> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| IndexedExpense {
                position: i + 1,
                record: record.clone(),
            })
            .collect()
    }
}

pub struct Ledger {
    db: Database,
    generation: u64,
    cache: RefCell<Option<LedgerSnapshot>>,
}

impl Ledger {
    pub fn open(path: &Path) -> Result<Self> {
        let ledger = Self::with_database(Database::open(path)?);
        info!(
            path = %ledger.db.path().display(),
            records = ledger.count()?,
            "Opened ledger"
        );
        Ok(ledger)
    }

    pub(crate) fn with_database(db: Database) -> Self {
        Self {
            db,
            generation: 0,
            cache: RefCell::new(None),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The current snapshot, read from the database if the cache is stale.
    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        if let Some(snapshot) = self.cache.borrow().as_ref() {
            return Ok(snapshot.clone());
        }
        let records: Arc<[ExpenseRecord]> = self.db.get_expenses()?.into();
        let snapshot = LedgerSnapshot {
            generation: self.generation,
            records,
        };
        debug!(
            generation = self.generation,
            records = snapshot.len(),
            "Refreshed ledger snapshot"
        );
        *self.cache.borrow_mut() = Some(snapshot.clone());
        Ok(snapshot)
    }

    pub fn all(&self) -> Result<Vec<IndexedExpense>> {
        Ok(self.snapshot()?.indexed())
    }

    pub fn count(&self) -> Result<usize> {
        self.db.get_expense_count()
    }

    pub fn append(
        &mut self,
        taxonomy: &Taxonomy,
        record: ExpenseRecord,
        policy: AmountPolicy,
    ) -> Result<()> {
        let record = validate_record(taxonomy, record, policy)?;
        self.db.insert_expense(&record)?;
        self.invalidate();
        debug!(
            date = %record.date,
            category = %record.category,
            amount = %record.amount,
            "Appended expense"
        );
        Ok(())
    }

    /// Append every record or none of them.
    pub fn append_all(
        &mut self,
        taxonomy: &Taxonomy,
        records: Vec<ExpenseRecord>,
        policy: AmountPolicy,
    ) -> Result<usize> {
        let records = validate_all(taxonomy, records, policy)?;
        let count = self.db.insert_expenses_batch(&records)?;
        self.invalidate();
        info!(count, "Appended expenses");
        Ok(count)
    }

    /// Replace the whole ledger. Every record is validated before anything is
    /// written.
    pub fn replace_all(
        &mut self,
        taxonomy: &Taxonomy,
        records: Vec<ExpenseRecord>,
        policy: AmountPolicy,
    ) -> Result<usize> {
        let records = validate_all(taxonomy, records, policy)?;
        let count = self.db.replace_expenses(&records)?;
        self.invalidate();
        info!(count, "Replaced ledger");
        Ok(count)
    }

    pub fn delete_by_positions(&mut self, positions: &BTreeSet<usize>) -> Result<usize> {
        if positions.is_empty() {
            return Ok(0);
        }
        let removed = self.db.delete_expenses_at(positions)?;
        self.invalidate();
        info!(removed, ?positions, "Deleted expenses");
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<usize> {
        let removed = self.db.clear_expenses()?;
        self.invalidate();
        info!(removed, "Cleared ledger");
        Ok(removed)
    }

    /// Drop cached views and re-read the database.
    pub fn reload(&mut self) -> Result<LedgerSnapshot> {
        self.invalidate();
        self.snapshot()
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        *self.cache.get_mut() = None;
    }

    // ── Budgets (persisted alongside the ledger) ──────────────

    pub(crate) fn budgets(&self) -> Result<Vec<Budget>> {
        self.db.get_budgets()
    }

    pub(crate) fn save_budget(&self, budget: &Budget) -> Result<()> {
        self.db.upsert_budget(budget)
    }

    pub(crate) fn remove_budget(&self, scope: &BudgetScope) -> Result<bool> {
        self.db.delete_budget(scope)
    }
}

fn validate_all(
    taxonomy: &Taxonomy,
    records: Vec<ExpenseRecord>,
    policy: AmountPolicy,
) -> std::result::Result<Vec<ExpenseRecord>, ValidationError> {
    records
        .into_iter()
        .map(|r| validate_record(taxonomy, r, policy))
        .collect()
}
