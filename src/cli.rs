use anyhow::{Context, Result};
use chrono::NaiveDate;
use grocery_ledger::util::{format_amount, truncate};
use grocery_ledger::{
    parse_amount, parse_positions, Alert, AlertSet, BudgetScope, ExpenseRecord, ImportMode,
    MonthKey, ParseError, Session,
};
use std::path::Path;

pub(crate) fn run(args: &[String], session: &mut Session) -> Result<()> {
    let rest = &args[1..];
    match args[0].as_str() {
        "taxonomy" | "t" => cli_taxonomy(session),
        "add" | "a" => cli_add(rest, session),
        "list" | "ls" => cli_list(rest, session),
        "delete" | "rm" => cli_delete(rest, session),
        "clear" => cli_clear(rest, session),
        "months" | "m" => cli_months(session),
        "categories" | "c" => cli_categories(rest, session),
        "breakdown" => cli_breakdown(rest, session),
        "budget" => cli_budget(rest, session),
        "unbudget" => cli_unbudget(rest, session),
        "budgets" => cli_budgets(session),
        "alerts" => cli_alerts(rest, session),
        "export" => cli_export(rest, session),
        "import" => cli_import(rest, session),
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("groceries - local grocery expense ledger");
    println!();
    println!("Usage: groceries [options] <command>");
    println!();
    println!("Commands:");
    println!("  taxonomy                      List categories, sub-categories and stores");
    println!("  add <cat> <sub> <store> <amt> Record a purchase");
    println!("    --date <YYYY-MM-DD>         Purchase date (default: today)");
    println!("    --note <text>               Free-text note");
    println!("    --ref <text>                Receipt reference");
    println!("  list [--month <YYYY-MM>]      List purchases with their positions");
    println!("  delete <positions>            Delete purchases, e.g. `delete 1,3`");
    println!("  clear --yes                   Delete the whole history");
    println!("  months                        Spending per month");
    println!("  categories [--month <M>]      Spending per category");
    println!("  breakdown [--month <M>]       Spending per category and sub-category");
    println!("  budget <total|cat> <amount>   Set a monthly limit");
    println!("  unbudget <total|cat>          Remove a monthly limit");
    println!("  budgets                       List limits with this month's spend");
    println!("  alerts [YYYY-MM]              Limits exceeded (default: current month)");
    println!("  export [path] [--month <M>]   Write CSV (default: stdout)");
    println!("  import <file.csv> [--replace] Import CSV history");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Options:");
    println!("  --db <path>                   Ledger database");
    println!("  --taxonomy <path>             Taxonomy CSV");
    println!("  --taxonomy-format <fmt>       auto, tabular or sparse");
    println!("  --taxonomy-skip-rows <n>      Leading rows of a tabular taxonomy (default: 2)");
    println!("  --taxonomy-column <n>         Category column of a tabular taxonomy (default: 1)");
    println!("  --strict-import               Reject zero amounts on import");
    println!("  -v, --verbose                 More logging (repeatable)");
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

/// Positional arguments, skipping `--flag value` pairs and bare switches.
fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if !matches!(arg.as_str(), "--yes" | "--replace") {
                iter.next();
            }
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

fn month_flag(args: &[String]) -> Result<Option<MonthKey>> {
    flag(args, "--month")
        .map(|m| m.parse::<MonthKey>())
        .transpose()
        .map_err(Into::into)
}

fn cli_taxonomy(session: &Session) -> Result<()> {
    let taxonomy = session.taxonomy();
    for entry in taxonomy.offered() {
        println!("{}", entry.category);
        for sub in &entry.subcategories {
            println!("  - {sub}");
        }
    }
    if !taxonomy.stores().is_empty() {
        println!();
        println!("Stores: {}", taxonomy.stores().join(", "));
    }
    Ok(())
}

fn cli_add(args: &[String], session: &mut Session) -> Result<()> {
    let pos = positional(args);
    let [category, subcategory, store, amount] = pos[..] else {
        anyhow::bail!(
            "Usage: groceries add <category> <sub-category> <store> <amount> [--date YYYY-MM-DD] [--note text]"
        );
    };

    let date = match flag(args, "--date") {
        Some(d) => NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .map_err(|_| ParseError::InvalidDate(d.to_string()))?,
        None => chrono::Local::now().date_naive(),
    };
    let mut record = ExpenseRecord::new(date, store, category, subcategory, parse_amount(amount)?);
    record.note = flag(args, "--note").map(str::to_string);
    record.reference = flag(args, "--ref").map(str::to_string);

    session.add_expense(record)?;
    println!("Added {category} / {subcategory} at {store}");
    let month = MonthKey::from_date(date);
    print_alerts(&session.check_alerts(month)?, month, session.config().currency());
    Ok(())
}

fn cli_list(args: &[String], session: &Session) -> Result<()> {
    let month = month_flag(args)?;
    let currency = session.config().currency();
    let expenses: Vec<_> = session
        .list_expenses()?
        .into_iter()
        .filter(|e| month.map_or(true, |m| m.contains(e.record.date)))
        .collect();

    if expenses.is_empty() {
        println!("No purchases");
        return Ok(());
    }

    println!(
        "{:>4}  {:<10}  {:<16}  {:<16}  {:<16}  {:>14}  Note",
        "#", "Date", "Store", "Category", "Sub-category", "Amount"
    );
    println!("{}", "─".repeat(90));
    for e in &expenses {
        let r = &e.record;
        println!(
            "{:>4}  {:<10}  {:<16}  {:<16}  {:<16}  {:>14}  {}",
            e.position,
            r.date,
            truncate(&r.store, 16),
            truncate(&r.category, 16),
            truncate(&r.subcategory, 16),
            format_amount(r.amount, currency),
            r.note.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn cli_delete(args: &[String], session: &mut Session) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("Usage: groceries delete <positions>  (e.g. 1,3 or 2 5)");
    }
    let positions = parse_positions(&args.join(" "))?;
    let removed = session.delete_expenses(&positions)?;
    println!("Deleted {removed} purchase(s)");
    Ok(())
}

fn cli_clear(args: &[String], session: &mut Session) -> Result<()> {
    if !args.iter().any(|a| a == "--yes") {
        anyhow::bail!("This deletes the whole history. Re-run with: groceries clear --yes");
    }
    let removed = session.clear_all()?;
    println!("Cleared {removed} purchase(s)");
    Ok(())
}

fn cli_months(session: &Session) -> Result<()> {
    let currency = session.config().currency();
    let months = session.aggregate_by_month()?;
    if months.is_empty() {
        println!("No purchases");
        return Ok(());
    }
    for m in &months {
        println!("  {}  {:>16}", m.month, format_amount(m.total, currency));
    }
    Ok(())
}

fn cli_categories(args: &[String], session: &Session) -> Result<()> {
    let currency = session.config().currency();
    let totals = session.aggregate_by_category(month_flag(args)?)?;
    if totals.is_empty() {
        println!("No purchases");
        return Ok(());
    }
    for c in &totals {
        println!("  {:<24} {:>16}", truncate(&c.category, 24), format_amount(c.total, currency));
    }
    Ok(())
}

fn cli_breakdown(args: &[String], session: &Session) -> Result<()> {
    let currency = session.config().currency();
    let totals = session.aggregate_by_subcategory(month_flag(args)?)?;
    let mut current: Option<&str> = None;
    for s in &totals {
        if current != Some(s.category.as_str()) {
            println!("{}", s.category);
            current = Some(s.category.as_str());
        }
        println!("  {:<22} {:>16}", truncate(&s.subcategory, 22), format_amount(s.total, currency));
    }
    if totals.is_empty() {
        println!("No purchases");
    }
    Ok(())
}

fn cli_budget(args: &[String], session: &mut Session) -> Result<()> {
    let [scope, amount] = args else {
        anyhow::bail!("Usage: groceries budget <total|category> <amount>");
    };
    let scope = BudgetScope::parse(scope);
    let limit = parse_amount(amount)?;
    session.set_budget(scope.clone(), limit)?;
    println!(
        "Budget for {scope}: {}",
        format_amount(limit, session.config().currency())
    );
    let month = MonthKey::current();
    print_alerts(&session.check_alerts(month)?, month, session.config().currency());
    Ok(())
}

fn cli_unbudget(args: &[String], session: &mut Session) -> Result<()> {
    let [scope] = args else {
        anyhow::bail!("Usage: groceries unbudget <total|category>");
    };
    let scope = BudgetScope::parse(scope);
    if session.remove_budget(&scope)? {
        println!("Removed budget for {scope}");
    } else {
        println!("No budget set for {scope}");
    }
    Ok(())
}

fn cli_budgets(session: &Session) -> Result<()> {
    let budgets = session.budgets();
    if budgets.is_empty() {
        println!("No budgets");
        return Ok(());
    }
    let currency = session.config().currency();
    let month = MonthKey::current();
    let by_category = session.aggregate_by_category(Some(month))?;
    let month_total = by_category
        .iter()
        .fold(rust_decimal::Decimal::ZERO, |acc, c| acc.saturating_add(c.total));

    println!("{:<24} {:>16} {:>16}", "Scope", "Limit", format!("Spent {month}"));
    println!("{}", "─".repeat(58));
    for budget in &budgets {
        let spent = match &budget.scope {
            BudgetScope::Total => month_total,
            BudgetScope::Category(name) => by_category
                .iter()
                .find(|c| &c.category == name)
                .map(|c| c.total)
                .unwrap_or_default(),
        };
        println!(
            "{:<24} {:>16} {:>16}",
            truncate(&budget.scope.to_string(), 24),
            format_amount(budget.limit, currency),
            format_amount(spent, currency)
        );
    }
    Ok(())
}

fn cli_alerts(args: &[String], session: &Session) -> Result<()> {
    let month = match args.first() {
        Some(m) => m.parse::<MonthKey>()?,
        None => MonthKey::current(),
    };
    let alerts = session.check_alerts(month)?;
    if alerts.is_empty() {
        println!("No budget exceeded in {month}");
        return Ok(());
    }
    print_alerts(&alerts, month, session.config().currency());
    Ok(())
}

fn print_alerts(alerts: &AlertSet, month: MonthKey, currency: &str) {
    for alert in alerts {
        println!("{}", alert_line(alert, month, currency));
    }
}

fn alert_line(alert: &Alert, month: MonthKey, currency: &str) -> String {
    format!(
        "Over budget ({month}): {} spent {} of {} (+{})",
        alert.scope,
        format_amount(alert.spent, currency),
        format_amount(alert.limit, currency),
        format_amount(alert.overspend(), currency)
    )
}

fn cli_export(args: &[String], session: &Session) -> Result<()> {
    let month = month_flag(args)?;

    match positional(args).first() {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {path}"))?;
            let count = session.export_csv(file, month)?;
            println!("Exported {count} purchase(s) to {path}");
        }
        None => {
            session.export_csv(std::io::stdout().lock(), month)?;
        }
    }
    Ok(())
}

fn cli_import(args: &[String], session: &mut Session) -> Result<()> {
    let Some(file_path) = positional(args).first().copied() else {
        anyhow::bail!("Usage: groceries import <file.csv> [--replace]");
    };
    let path = Path::new(file_path);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let mode = if args.iter().any(|a| a == "--replace") {
        ImportMode::Replace
    } else {
        ImportMode::Append
    };
    let count = session.import_csv(path, mode)?;
    match mode {
        ImportMode::Replace => println!("Replaced history with {count} purchase(s)"),
        ImportMode::Append => println!("Imported {count} purchase(s)"),
    }
    Ok(())
}
