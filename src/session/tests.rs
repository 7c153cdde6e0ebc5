#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::{Error, ParseError};
use crate::ledger::parse_positions;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tempfile::TempDir;

const TAXONOMY: &str = "\
Liste des courses,,,
,Catégorie,Sous-catégorie,Magasin
1,Fruits,Bananes,Marché A
2,Fruits,Pommes,Marjane
3,Légumes,Tomates,Marjane
4,Légumes,Oignons,
";

fn session() -> (TempDir, Session) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("taxonomy.csv"), TAXONOMY).unwrap();
    let session = Session::open(Config::in_dir(dir.path())).unwrap();
    (dir, session)
}

fn rec(date: &str, category: &str, subcategory: &str, amount: Decimal) -> ExpenseRecord {
    ExpenseRecord::new(
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        "Marché A",
        category,
        subcategory,
        amount,
    )
}

fn march() -> MonthKey {
    "2024-03".parse().unwrap()
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn test_open_without_taxonomy_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = Session::open(Config::in_dir(dir.path())).err().unwrap();
    assert!(matches!(err, Error::SourceUnavailable { .. }));
    assert!(!err.is_recoverable());
}

#[test]
fn test_taxonomy_is_exposed() {
    let (_dir, session) = session();
    assert!(session.taxonomy().contains("Fruits", "Bananes"));
    assert_eq!(session.taxonomy().stores(), ["Marché A", "Marjane"]);
}

#[test]
fn test_state_survives_reopen() {
    let (dir, mut session) = session();
    session
        .add_expense(rec("2024-03-05", "Fruits", "Bananes", dec!(12.50)))
        .unwrap();
    session
        .set_budget(BudgetScope::Category("Fruits".into()), dec!(10))
        .unwrap();
    drop(session);

    let session = Session::open(Config::in_dir(dir.path())).unwrap();
    assert_eq!(session.list_expenses().unwrap().len(), 1);
    assert_eq!(
        session.budgets(),
        vec![Budget::new(BudgetScope::Category("Fruits".into()), dec!(10))]
    );
}

// ── Worked examples ───────────────────────────────────────────

#[test]
fn test_add_aggregate_and_alert() {
    let (_dir, mut session) = session();
    session
        .add_expense(rec("2024-03-05", "Fruits", "Bananes", dec!(12.50)))
        .unwrap();

    let months = session.aggregate_by_month().unwrap();
    assert_eq!(months.len(), 1);
    assert_eq!(months[0].month, march());
    assert_eq!(months[0].total, dec!(12.50));

    session
        .set_budget(BudgetScope::Category("Fruits".into()), dec!(10))
        .unwrap();
    let alerts: Vec<_> = session.check_alerts(march()).unwrap().into_iter().collect();
    assert_eq!(
        alerts,
        vec![crate::budget::Alert {
            scope: BudgetScope::Category("Fruits".into()),
            spent: dec!(12.50),
            limit: dec!(10),
        }]
    );
}

#[test]
fn test_zero_amount_rejected_on_add() {
    let (_dir, mut session) = session();
    let err = session
        .add_expense(rec("2024-03-05", "Fruits", "Bananes", Decimal::ZERO))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::InvalidAmount(_))));
    assert!(err.is_recoverable());
    assert!(session.list_expenses().unwrap().is_empty());
}

#[test]
fn test_oversized_amount_never_reaches_summaries() {
    let (_dir, mut session) = session();
    let huge = crate::ledger::parse_amount("79228162514264337593543950335").unwrap();
    for _ in 0..2 {
        let err = session
            .add_expense(rec("2024-03-05", "Fruits", "Bananes", huge))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidAmount(_))));
    }
    session
        .add_expense(rec("2024-03-05", "Fruits", "Bananes", dec!(12.50)))
        .unwrap();

    assert_eq!(session.aggregate_by_month().unwrap()[0].total, dec!(12.50));
    assert!(session.check_alerts(march()).unwrap().is_empty());
}

#[test]
fn test_delete_first_and_third() {
    let (_dir, mut session) = session();
    for (day, sub) in [("01", "Bananes"), ("02", "Pommes"), ("03", "Bananes")] {
        session
            .add_expense(rec(&format!("2024-03-{day}"), "Fruits", sub, dec!(1)))
            .unwrap();
    }
    let removed = session
        .delete_expenses(&parse_positions("1,3").unwrap())
        .unwrap();
    assert_eq!(removed, 2);

    let remaining = session.list_expenses().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].position, 1);
    assert_eq!(remaining[0].record.subcategory, "Pommes");
}

#[test]
fn test_delete_out_of_range_leaves_ledger() {
    let (_dir, mut session) = session();
    session
        .add_expense(rec("2024-03-01", "Fruits", "Bananes", dec!(1)))
        .unwrap();
    let err = session
        .delete_expenses(&parse_positions("1 4").unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::IndexOutOfRange { position: 4, count: 1 })
    ));
    assert_eq!(session.list_expenses().unwrap().len(), 1);
}

#[test]
fn test_bad_month_is_parse_error() {
    assert!(matches!(
        "2024-13".parse::<MonthKey>(),
        Err(ParseError::InvalidMonth(_))
    ));
}

// ── Aggregation ───────────────────────────────────────────────

#[test]
fn test_category_views_with_month_filter() {
    let (_dir, mut session) = session();
    session
        .add_expense(rec("2024-02-28", "Légumes", "Tomates", dec!(30)))
        .unwrap();
    session
        .add_expense(rec("2024-03-01", "Fruits", "Pommes", dec!(5)))
        .unwrap();
    session
        .add_expense(rec("2024-03-02", "Légumes", "Oignons", dec!(2)))
        .unwrap();

    let all: Vec<String> = session
        .aggregate_by_category(None)
        .unwrap()
        .into_iter()
        .map(|c| c.category)
        .collect();
    assert_eq!(all, vec!["Légumes", "Fruits"]);

    let in_march: Vec<String> = session
        .aggregate_by_category(Some(march()))
        .unwrap()
        .into_iter()
        .map(|c| c.category)
        .collect();
    assert_eq!(in_march, vec!["Fruits", "Légumes"]);

    let subs = session.aggregate_by_subcategory(Some(march())).unwrap();
    assert_eq!(subs.len(), 2);
    assert_eq!(session.month_expenses(march()).unwrap().len(), 2);
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_budget_for_unknown_category_rejected() {
    let (_dir, mut session) = session();
    let err = session
        .set_budget(BudgetScope::Category("Viande".into()), dec!(10))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::InvalidCategory(_))));
    assert!(session.budgets().is_empty());
}

#[test]
fn test_negative_budget_rejected() {
    let (_dir, mut session) = session();
    let err = session.set_budget(BudgetScope::Total, dec!(-5)).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::InvalidBudget(_))));
    assert!(session.budgets().is_empty());
}

#[test]
fn test_total_budget_and_removal() {
    let (_dir, mut session) = session();
    session
        .add_expense(rec("2024-03-01", "Fruits", "Pommes", dec!(60)))
        .unwrap();
    session
        .add_expense(rec("2024-03-02", "Légumes", "Tomates", dec!(50)))
        .unwrap();
    session.set_budget(BudgetScope::Total, dec!(100)).unwrap();

    let alerts = session.check_alerts(march()).unwrap();
    assert_eq!(alerts.total().unwrap().spent, dec!(110));

    assert!(session.remove_budget(&BudgetScope::Total).unwrap());
    assert!(!session.remove_budget(&BudgetScope::Total).unwrap());
    assert!(session.check_alerts(march()).unwrap().is_empty());
}

// ── Import / export ───────────────────────────────────────────

#[test]
fn test_export_then_replace_import() {
    let (dir, mut session) = session();
    session
        .add_expense(rec("2024-02-10", "Fruits", "Pommes", dec!(3.20)))
        .unwrap();
    session
        .add_expense(rec("2024-03-05", "Fruits", "Bananes", dec!(12.50)).with_note("bio"))
        .unwrap();

    let path = dir.path().join("export.csv");
    let file = std::fs::File::create(&path).unwrap();
    assert_eq!(session.export_csv(file, Some(march())).unwrap(), 1);

    assert_eq!(session.import_csv(&path, ImportMode::Replace).unwrap(), 1);
    let records = session.snapshot().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records.records()[0].note.as_deref(), Some("bio"));
}

#[test]
fn test_import_legacy_appends_with_zero_amount() {
    let (dir, mut session) = session();
    let path = dir.path().join("achats.csv");
    std::fs::write(
        &path,
        "Date,Catégorie,Sous-catégorie,Magasin,Montant (DH),Note\n\
         2024-03-05 00:00:00,Fruits,Bananes,Marché A,12.5,\n\
         2024-03-06 00:00:00,Légumes,Tomates,Marjane,0.0,offert\n",
    )
    .unwrap();

    assert_eq!(session.import_csv(&path, ImportMode::Append).unwrap(), 2);
    assert_eq!(session.aggregate_by_month().unwrap()[0].total, dec!(12.5));
}

#[test]
fn test_import_is_all_or_nothing() {
    let (dir, mut session) = session();
    session
        .add_expense(rec("2024-03-01", "Fruits", "Pommes", dec!(1)))
        .unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(
        &path,
        "Date,Store,Category,Subcategory,Amount\n\
         2024-03-05,Marché A,Fruits,Bananes,2\n\
         2024-03-06,Marché A,Viande,Poulet,3\n",
    )
    .unwrap();

    let err = session.import_csv(&path, ImportMode::Replace).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::InvalidCategory(_))));
    assert_eq!(session.list_expenses().unwrap().len(), 1);
}

#[test]
fn test_import_negative_amount_rejected() {
    let (dir, mut session) = session();
    let path = dir.path().join("neg.csv");
    std::fs::write(
        &path,
        "Date,Store,Category,Subcategory,Amount\n2024-03-05,Marché A,Fruits,Bananes,-2\n",
    )
    .unwrap();
    assert!(session.import_csv(&path, ImportMode::Append).is_err());
    assert!(session.list_expenses().unwrap().is_empty());
}

// ── Reload / refresh ──────────────────────────────────────────

#[test]
fn test_reload_sees_other_session_writes() {
    let (dir, mut first) = session();
    let mut second = Session::open(Config::in_dir(dir.path())).unwrap();
    assert!(first.list_expenses().unwrap().is_empty());

    second
        .add_expense(rec("2024-03-01", "Fruits", "Pommes", dec!(4)))
        .unwrap();
    second.set_budget(BudgetScope::Total, dec!(1)).unwrap();

    assert_eq!(first.reload().unwrap().len(), 1);
    assert_eq!(first.budgets().len(), 1);
}

#[test]
fn test_refresh_taxonomy() {
    let (dir, mut session) = session();
    std::fs::write(
        dir.path().join("taxonomy.csv"),
        format!("{TAXONOMY}5,Viande,Poulet,Boucherie\n"),
    )
    .unwrap();
    assert!(session.refresh_taxonomy().unwrap().has_category("Viande"));

    std::fs::remove_file(dir.path().join("taxonomy.csv")).unwrap();
    assert!(session.refresh_taxonomy().is_err());
    assert!(session.taxonomy().has_category("Viande"));
}
