pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS expenses (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    date        TEXT NOT NULL,
    store       TEXT NOT NULL,
    category    TEXT NOT NULL,
    subcategory TEXT NOT NULL,
    amount      TEXT NOT NULL,
    reference   TEXT,
    note        TEXT
);

CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);

CREATE TABLE IF NOT EXISTS budgets (
    scope        TEXT NOT NULL,
    category     TEXT NOT NULL DEFAULT '',
    limit_amount TEXT NOT NULL,
    PRIMARY KEY (scope, category)
);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;
