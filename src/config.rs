//! Where the ledger and taxonomy live, and how they are read.
//!
//! Resolution order is explicit builder calls (CLI flags), then environment
//! variables, then defaults under the platform data directory.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, ParseError, Result};
use crate::ledger::AmountPolicy;
use crate::taxonomy::TaxonomyFormat;

pub const HOME_ENV: &str = "GROCERY_LEDGER_HOME";
pub const TAXONOMY_ENV: &str = "GROCERY_LEDGER_TAXONOMY";
pub const TAXONOMY_FORMAT_ENV: &str = "GROCERY_LEDGER_TAXONOMY_FORMAT";
pub const TAXONOMY_SKIP_ROWS_ENV: &str = "GROCERY_LEDGER_TAXONOMY_SKIP_ROWS";
pub const TAXONOMY_COLUMN_ENV: &str = "GROCERY_LEDGER_TAXONOMY_COLUMN";
pub const CURRENCY_ENV: &str = "GROCERY_LEDGER_CURRENCY";
pub const ZERO_IMPORTS_ENV: &str = "GROCERY_LEDGER_ZERO_IMPORTS";

pub const DB_FILE: &str = "ledger.db";
pub const TAXONOMY_FILE: &str = "taxonomy.csv";
pub const DEFAULT_CURRENCY: &str = "MAD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    data_dir: PathBuf,
    db_path: PathBuf,
    taxonomy_path: PathBuf,
    taxonomy_format: TaxonomyFormat,
    currency: String,
    import_policy: AmountPolicy,
}

impl Config {
    /// Defaults rooted at `data_dir`.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            db_path: data_dir.join(DB_FILE),
            taxonomy_path: data_dir.join(TAXONOMY_FILE),
            data_dir,
            taxonomy_format: TaxonomyFormat::default(),
            currency: DEFAULT_CURRENCY.to_string(),
            import_policy: AmountPolicy::NonNegative,
        }
    }

    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = match var(HOME_ENV) {
            Some(home) => PathBuf::from(home),
            None => default_data_dir()?,
        };
        let mut config = Self::in_dir(data_dir);
        if let Some(taxonomy) = var(TAXONOMY_ENV) {
            config.taxonomy_path = PathBuf::from(taxonomy);
        }
        if let Some(format) = var(TAXONOMY_FORMAT_ENV) {
            config.taxonomy_format = TaxonomyFormat::parse(&format).ok_or_else(|| {
                ParseError::InvalidInput(format!("{TAXONOMY_FORMAT_ENV}={format}"))
            })?;
        }
        let skip_rows = var(TAXONOMY_SKIP_ROWS_ENV)
            .map(|v| parse_count(TAXONOMY_SKIP_ROWS_ENV, &v))
            .transpose()?;
        let category_column = var(TAXONOMY_COLUMN_ENV)
            .map(|v| parse_count(TAXONOMY_COLUMN_ENV, &v))
            .transpose()?;
        config = config.with_tabular_overrides(skip_rows, category_column);
        if let Some(currency) = var(CURRENCY_ENV) {
            config.currency = currency.trim().to_string();
        }
        if let Some(allowed) = var(ZERO_IMPORTS_ENV) {
            let allowed = match allowed.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ParseError::InvalidInput(format!(
                        "{ZERO_IMPORTS_ENV}={allowed}"
                    ))
                    .into())
                }
            };
            config = config.with_zero_amount_imports(allowed);
        }
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_taxonomy_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.taxonomy_path = path.into();
        self
    }

    pub fn with_taxonomy_format(mut self, format: TaxonomyFormat) -> Self {
        self.taxonomy_format = format;
        self
    }

    /// Replace the tabular skip rows and/or primary column, keeping the
    /// current shape. No effect on a sparse format.
    pub fn with_tabular_overrides(
        mut self,
        skip_rows: Option<usize>,
        category_column: Option<usize>,
    ) -> Self {
        if let Some(mut layout) = self.taxonomy_format.layout() {
            if let Some(skip_rows) = skip_rows {
                layout.skip_rows = skip_rows;
            }
            if let Some(category_column) = category_column {
                layout.category_column = category_column;
            }
            self.taxonomy_format = self.taxonomy_format.with_layout(layout);
        }
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Whether imported history may carry zero amounts.
    pub fn with_zero_amount_imports(mut self, allowed: bool) -> Self {
        self.import_policy = if allowed {
            AmountPolicy::NonNegative
        } else {
            AmountPolicy::Positive
        };
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn taxonomy_path(&self) -> &Path {
        &self.taxonomy_path
    }

    pub fn taxonomy_format(&self) -> TaxonomyFormat {
        self.taxonomy_format
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn import_policy(&self) -> AmountPolicy {
        self.import_policy
    }

    /// Create the directory holding the ledger database.
    pub fn ensure_dirs(&self) -> Result<()> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::unavailable(parent, e))?;
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidInput(format!("{key}={value}")).into())
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "grocery-ledger", "GroceryLedger")
        .ok_or_else(|| Error::unavailable("data directory", "could not determine home directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}
