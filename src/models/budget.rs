use rust_decimal::Decimal;

/// What a budget limit applies to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BudgetScope {
    Total,
    Category(String),
}

impl BudgetScope {
    /// Parse a scope as typed by a user: `total` (any case) or a category name.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("total") {
            Self::Total
        } else {
            Self::Category(trimmed.to_string())
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Total => None,
            Self::Category(name) => Some(name),
        }
    }
}

impl std::fmt::Display for BudgetScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Total => write!(f, "Total"),
            Self::Category(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    pub scope: BudgetScope,
    pub limit: Decimal,
}

impl Budget {
    pub fn new(scope: BudgetScope, limit: Decimal) -> Self {
        Self { scope, limit }
    }
}
