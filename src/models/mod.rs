mod budget;
mod expense;
mod month;
mod taxonomy;

pub use budget::{Budget, BudgetScope};
pub use expense::{ExpenseRecord, IndexedExpense};
pub use month::MonthKey;
pub use taxonomy::{is_sentinel, Taxonomy, TaxonomyBuilder, TaxonomyEntry};
