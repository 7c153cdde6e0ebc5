//! Grocery Ledger: a local-only grocery expense tracker.
//!
//! Purchases are recorded against a category / sub-category / store
//! taxonomy read from a reference spreadsheet export, kept in a SQLite
//! ledger, summarized by month and category, and compared against
//! optional budgets. [`Session`] is the entry point for front ends.

pub mod aggregate;
pub mod budget;
pub mod config;
mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod ledger;
pub mod models;
pub mod session;
pub mod taxonomy;
pub mod util;

#[cfg(test)]
#[path = "util_tests.rs"]
mod util_tests;

pub use budget::{Alert, AlertSet, BudgetBook};
pub use config::Config;
pub use error::{Error, ParseError, Result, ValidationError};
pub use import::ImportMode;
pub use ledger::{parse_amount, parse_positions, AmountPolicy, LedgerSnapshot};
pub use models::{Budget, BudgetScope, ExpenseRecord, IndexedExpense, MonthKey, Taxonomy};
pub use session::Session;
pub use taxonomy::{TabularLayout, TaxonomyFormat};
