use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tally_finance::{
    analyze_file, consolidate_statement, write_records_csv, ClassifierStore, StoreError,
};
use tally_ingest::read_statement;

mod config;
mod logging;
mod prompt;
mod report;
mod state;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version,
    long_version = LONG_VERSION,
    about = "Summarize a bank statement export by spending category"
)]
struct Cli {
    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement, classify new counterparties and print category totals
    Analyze {
        /// Statement already converted to plain text
        statement: PathBuf,

        /// Classifier store (default: config, then ~/.tally/collectors)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Print the report as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write consolidated records as CSV without classifying
    Export {
        statement: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Statement year, used to add ISO dates
        #[arg(long)]
        year: Option<i32>,
    },

    /// Inspect the classifier store
    Store {
        #[command(subcommand)]
        command: StoreCommand,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Print every stored counterparty and its category
    List {
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Analyze {
            statement,
            store,
            json,
        } => analyze(statement, store, json)?,

        Command::Export {
            statement,
            out,
            year,
        } => export(statement, out, year)?,

        Command::Store { command } => match command {
            StoreCommand::List { store } => list_store(store)?,
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn analyze(statement: PathBuf, store: Option<PathBuf>, json: bool) -> Result<()> {
    if !statement.exists() {
        bail!("statement not found: {}", statement.display());
    }
    let cfg = config::load_config()?;
    let store = ClassifierStore::new(cfg.store_path(store)?);
    tracing::debug!(store = %store.path().display(), "using classifier store");
    if !store.exists() {
        println!("No classifier store at {}, performing setup", store.path().display());
    }

    let mut categories = cfg.category_set();
    let mut operator = prompt::TerminalOperator::default();
    let report = analyze_file(&statement, &cfg.lexer, &store, &mut categories, &mut operator)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report).context("serialize report")?);
    } else {
        print!("{}", report::render(&report));
    }
    Ok(())
}

fn export(statement: PathBuf, out: Option<PathBuf>, year: Option<i32>) -> Result<()> {
    let cfg = config::load_config()?;
    let text = read_statement(&statement)?;
    let (records, warnings) = consolidate_statement(&text, &cfg.lexer);
    for w in &warnings {
        tracing::warn!("{w}");
    }

    match out {
        Some(path) => {
            let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
            write_records_csv(&records, year, file)?;
            eprintln!("Wrote {} records to {}", records.len(), path.display());
        }
        None => write_records_csv(&records, year, io::stdout().lock())?,
    }
    Ok(())
}

fn list_store(store: Option<PathBuf>) -> Result<()> {
    let cfg = config::load_config()?;
    let store = ClassifierStore::new(cfg.store_path(store)?);
    let mapping = match store.load() {
        Ok(m) => m,
        Err(StoreError::NotFound(p)) => {
            println!("No classifier store at {} yet (run `tally analyze`)", p.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let width = mapping.iter().map(|e| e.counterparty.len()).max().unwrap_or(0);
    for e in mapping.iter() {
        println!("{:<width$}  {}", e.counterparty, e.category);
    }
    println!("\n{} entries in {}", mapping.len(), store.path().display());
    Ok(())
}
