mod schema;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{Error, Result, ValidationError};
use crate::models::{Budget, BudgetScope, ExpenseRecord};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

const SCOPE_TOTAL: &str = "total";
const SCOPE_CATEGORY: &str = "category";

/// SQLite backing for the ledger: one flat `expenses` table plus `budgets`.
/// Every mutating call commits before returning.
pub(crate) struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No ledger found, creating a new one");
        }
        let conn = Connection::open(path).map_err(|e| Error::unavailable(path, e))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| Error::unavailable(path, e))?;
        let mut db = Self {
            conn,
            path: path.to_path_buf(),
        };
        db.migrate().map_err(|e| match e {
            Error::SourceUnavailable { .. } => e,
            other => Error::unavailable(path, other),
        })?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        db.migrate()?;
        Ok(db)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn migrate(&mut self) -> Result<()> {
        // Check if schema_version table exists
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?;
        if current != schema::CURRENT_VERSION {
            return Err(Error::unavailable(
                &self.path,
                format!(
                    "unsupported schema version {current} (expected {})",
                    schema::CURRENT_VERSION
                ),
            ));
        }
        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn insert_expense(&self, record: &ExpenseRecord) -> Result<i64> {
        insert(&self.conn, record)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn insert_expenses_batch(&mut self, records: &[ExpenseRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for record in records {
            insert(&tx, record)?;
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Replace the whole ledger with `records` in one transaction.
    pub(crate) fn replace_expenses(&mut self, records: &[ExpenseRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM expenses", [])?;
        for record in records {
            insert(&tx, record)?;
        }
        tx.commit()?;
        debug!(removed, inserted = records.len(), "Replaced ledger contents");
        Ok(records.len())
    }

    /// All expenses in insertion order.
    pub(crate) fn get_expenses(&self) -> Result<Vec<ExpenseRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, store, category, subcategory, amount, reference, note
             FROM expenses ORDER BY id",
        )?;
        let rows = stmt.query_map([], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_expense_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Delete the expenses at the given 1-based positions (insertion order).
    /// Positions are resolved and checked inside one transaction; if any is out
    /// of range nothing is deleted.
    pub(crate) fn delete_expenses_at(&mut self, positions: &BTreeSet<usize>) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let ids: Vec<i64> = {
            let mut stmt = tx.prepare("SELECT id FROM expenses ORDER BY id")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        let count = ids.len();
        if let Some(&position) = positions.iter().find(|&&p| p == 0 || p > count) {
            return Err(ValidationError::IndexOutOfRange { position, count }.into());
        }

        for &position in positions {
            tx.execute("DELETE FROM expenses WHERE id = ?1", params![ids[position - 1]])?;
        }
        tx.commit()?;
        Ok(positions.len())
    }

    pub(crate) fn clear_expenses(&mut self) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM expenses", [])?;
        tx.commit()?;
        Ok(removed)
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn get_budgets(&self) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT scope, category, limit_amount FROM budgets ORDER BY scope DESC, category",
        )?;
        let rows = stmt.query_map([], |row| {
            let scope: String = row.get(0)?;
            let category: String = row.get(1)?;
            let limit = decimal_column(row, 2)?;
            let scope = if scope == SCOPE_TOTAL {
                BudgetScope::Total
            } else {
                BudgetScope::Category(category)
            };
            Ok(Budget::new(scope, limit))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn upsert_budget(&self, budget: &Budget) -> Result<()> {
        let (scope, category) = scope_columns(&budget.scope);
        self.conn.execute(
            "INSERT INTO budgets (scope, category, limit_amount)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(scope, category) DO UPDATE SET limit_amount = ?3",
            params![scope, category, budget.limit.to_string()],
        )?;
        Ok(())
    }

    pub(crate) fn delete_budget(&self, scope: &BudgetScope) -> Result<bool> {
        let (scope, category) = scope_columns(scope);
        let removed = self.conn.execute(
            "DELETE FROM budgets WHERE scope = ?1 AND category = ?2",
            params![scope, category],
        )?;
        Ok(removed > 0)
    }
}

fn insert(conn: &Connection, record: &ExpenseRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO expenses (date, store, category, subcategory, amount, reference, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.date.format(DATE_FORMAT).to_string(),
            record.store,
            record.category,
            record.subcategory,
            record.amount.to_string(),
            record.reference,
            record.note,
        ],
    )?;
    Ok(())
}

fn scope_columns(scope: &BudgetScope) -> (&'static str, &str) {
    match scope {
        BudgetScope::Total => (SCOPE_TOTAL, ""),
        BudgetScope::Category(name) => (SCOPE_CATEGORY, name.as_str()),
    }
}

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<ExpenseRecord> {
    let date_str: String = row.get(0)?;
    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    Ok(ExpenseRecord {
        date,
        store: row.get(1)?,
        category: row.get(2)?,
        subcategory: row.get(3)?,
        amount: decimal_column(row, 4)?,
        reference: row.get(5)?,
        note: row.get(6)?,
    })
}

fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
