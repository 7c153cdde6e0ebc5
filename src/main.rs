mod cli;

use anyhow::{Context, Result};
use grocery_ledger::{Config, Session, TaxonomyFormat};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Flags accepted before or after the command.
#[derive(Debug, Default)]
struct GlobalArgs {
    db: Option<PathBuf>,
    taxonomy: Option<PathBuf>,
    taxonomy_format: Option<TaxonomyFormat>,
    taxonomy_skip_rows: Option<usize>,
    taxonomy_column: Option<usize>,
    strict_import: bool,
    verbosity: u8,
    command: Vec<String>,
}

fn main() -> Result<()> {
    let global = parse_global_args(std::env::args().skip(1))?;
    init_logger(log_level(global.verbosity));
    debug!(?global, "Parsed arguments");

    match global.command.first().map(|s| s.as_str()) {
        None | Some("--help" | "-h" | "help") => {
            cli::print_usage();
            return Ok(());
        }
        Some("--version" | "-V" | "version") => {
            println!("groceries {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(_) => {}
    }

    let config = build_config(&global, Config::from_env()?);
    let mut session = Session::open(config).context("Failed to open the grocery ledger")?;
    cli::run(&global.command, &mut session)
}

fn parse_global_args(mut args: impl Iterator<Item = String>) -> Result<GlobalArgs> {
    let mut global = GlobalArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = args.next().context("--db needs a path")?;
                global.db = Some(PathBuf::from(value));
            }
            "--taxonomy" => {
                let value = args.next().context("--taxonomy needs a path")?;
                global.taxonomy = Some(PathBuf::from(value));
            }
            "--taxonomy-format" => {
                let value = args
                    .next()
                    .context("--taxonomy-format needs auto, tabular or sparse")?;
                let format = TaxonomyFormat::parse(&value)
                    .with_context(|| format!("Unknown taxonomy format: {value}"))?;
                global.taxonomy_format = Some(format);
            }
            "--taxonomy-skip-rows" => {
                global.taxonomy_skip_rows = Some(count_arg(&arg, args.next())?);
            }
            "--taxonomy-column" => {
                global.taxonomy_column = Some(count_arg(&arg, args.next())?);
            }
            "--strict-import" => global.strict_import = true,
            "-v" | "--verbose" => global.verbosity += 1,
            "-vv" => global.verbosity += 2,
            _ => global.command.push(arg),
        }
    }
    Ok(global)
}

fn count_arg(flag: &str, value: Option<String>) -> Result<usize> {
    let value = value.with_context(|| format!("{flag} needs a number"))?;
    value
        .trim()
        .parse()
        .with_context(|| format!("{flag} needs a number, got '{value}'"))
}

/// Layer the command-line flags over `config`.
fn build_config(global: &GlobalArgs, mut config: Config) -> Config {
    if let Some(db) = &global.db {
        config = config.with_db_path(db);
    }
    if let Some(taxonomy) = &global.taxonomy {
        config = config.with_taxonomy_path(taxonomy);
    }
    if let Some(format) = global.taxonomy_format {
        // Layout from the environment survives a shape override
        let format = match config.taxonomy_format().layout() {
            Some(layout) => format.with_layout(layout),
            None => format,
        };
        config = config.with_taxonomy_format(format);
    }
    config = config.with_tabular_overrides(global.taxonomy_skip_rows, global.taxonomy_column);
    if global.strict_import {
        config = config.with_zero_amount_imports(false);
    }
    config
}

fn log_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // Library and binary at the same level
        None => EnvFilter::new(format!(
            "grocery_ledger={level},{}={level}",
            env!("CARGO_CRATE_NAME")
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
