//! These structs provide the CLI interface for the findash CLI.

use crate::model::{Amount, AmountError};
use crate::render::{Format, Section};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

/// findash: a personal finance dashboard for your terminal.
///
/// Give it a CSV file of transactions with Date, Category and Amount columns. Positive amounts are
/// income and negative amounts are expenses. It reports your total income, expenses, net income
/// and what is left of your monthly budget, along with the spending trend, spending by category,
/// income versus expenses and the transactions themselves, filtered to the categories you choose.
#[derive(Debug, Parser, Clone)]
#[command(name = "findash", version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a config file with the default settings.
    ///
    /// The file is written to --config if given, otherwise to the default location. An existing
    /// file is never overwritten. Edit it to change the default monthly budget, the date formats
    /// accepted in the Date column or the field delimiter.
    Init,
    /// List the categories found in a transactions file.
    Categories(CategoriesArgs),
    /// Print the dashboard for a transactions file.
    Report(ReportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The config file. Defaults to findash/config.json in your config directory, and the
    /// built-in defaults are used if that does not exist.
    #[arg(long, env = "FINDASH_CONFIG")]
    config: Option<PathBuf>,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }
}

/// (Not shown): Args for the `findash categories` command.
#[derive(Debug, Parser, Clone)]
pub struct CategoriesArgs {
    /// The transactions file to read, or - for stdin.
    #[arg(long, short = 'f')]
    file: PathBuf,
}

impl CategoriesArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// (Not shown): Args for the `findash report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// The transactions file to read, or - for stdin.
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    /// Only include this category. Repeat to include several. By default every category in the
    /// file is included.
    #[arg(long, short = 'c')]
    category: Vec<String>,

    /// Leave this category out. Repeat to leave out several.
    #[arg(long, short = 'x')]
    exclude: Vec<String>,

    /// The monthly budget. Defaults to the config file's monthly_budget, or 1500.
    #[arg(long, short = 'b', allow_negative_numbers = true, value_parser = parse_budget)]
    budget: Option<Decimal>,

    /// How to print the report.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Print only one part of the dashboard.
    #[arg(long, value_enum, default_value_t = Section::All)]
    section: Section,
}

impl ReportArgs {
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn categories(&self) -> &[String] {
        &self.category
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn budget(&self) -> Option<Decimal> {
        self.budget
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn section(&self) -> Section {
        self.section
    }
}

/// Budgets are written like amounts, so `$2,000` works, and are held to the same bounds.
fn parse_budget(s: &str) -> Result<Decimal, AmountError> {
    Amount::from_str(s).map(|a| a.value())
}
