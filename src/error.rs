use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the ledger core.
#[derive(Debug, Error)]
pub enum Error {
    /// A taxonomy, ledger or import file is missing or unreadable.
    #[error("Source unavailable: {}: {reason}", path.display())]
    SourceUnavailable { path: PathBuf, reason: String },

    /// A source file was readable but one of its rows does not map onto the
    /// canonical schema.
    #[error("Malformed source {} (line {line}): {reason}", path.display())]
    MalformedSource {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input rejected at the boundary. The ledger is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unknown category: '{0}'")]
    InvalidCategory(String),

    #[error("Unknown sub-category '{subcategory}' for category '{category}'")]
    InvalidSubcategory {
        category: String,
        subcategory: String,
    },

    #[error("Invalid amount: {0} (expected a positive value up to 1000000000 with at most 2 decimals)")]
    InvalidAmount(Decimal),

    #[error("Invalid budget limit: {0} (must not be negative)")]
    InvalidBudget(Decimal),

    #[error("Store is required")]
    MissingStore,

    #[error("Position {position} is out of range (ledger has {count} records)")]
    IndexOutOfRange { position: usize, count: usize },
}

/// User input that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid month '{0}' (expected YYYY-MM)")]
    InvalidMonth(String),

    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),
}

impl Error {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, line: u64, reason: impl ToString) -> Self {
        Self::MalformedSource {
            path: path.into(),
            line,
            reason: reason.to_string(),
        }
    }

    /// Recoverable errors leave state untouched and can be corrected by the user.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Parse(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
