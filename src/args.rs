use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::{parse_date, Interval, IntervalError};
use crate::config::AccountConfig;

/// Append downloaded bank transactions to the budget period they belong to.
#[derive(Parser, Debug)]
pub struct Args {
    #[clap(flatten)]
    pub options: OptionArgs,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct OptionArgs {
    /// The options file to read at startup [default: ~/.budget-update/options.json]
    #[clap(long, global = true)]
    pub config_file: Option<PathBuf>,

    /// Name of the catalog listing the budget periods
    #[clap(long, global = true)]
    pub catalog_id: Option<String>,

    /// Directory containing the catalog files
    #[clap(long, global = true)]
    pub catalog_dir: Option<PathBuf>,

    /// Directory containing the budget ledgers
    #[clap(long, global = true)]
    pub ledger_dir: Option<PathBuf>,

    /// Category label put in the first column of each appended row
    #[clap(long, global = true)]
    pub category: Option<String>,

    /// Leave out the category column
    #[clap(long, global = true)]
    pub no_category_column: bool,

    /// Account to download transactions for, as NAME=HISTORY_CSV. Can be repeated.
    #[clap(long = "account", global = true, value_parser = parse_account)]
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write an options file with the current settings
    Init,

    /// List the budget periods in the catalog and whether they're active
    Periods(IntervalArgs),

    /// Append account transactions to the active budget periods
    Update {
        #[clap(flatten)]
        interval: IntervalArgs,

        /// Give up if the update takes longer than this many seconds
        #[clap(long)]
        timeout_secs: Option<u64>,
    },
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct IntervalArgs {
    /// First day to consider [default: --to]
    #[clap(long, value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,

    /// Last day to consider [default: today]
    #[clap(long, value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,
}

impl IntervalArgs {
    pub fn interval(&self, today: NaiveDate) -> Result<Interval, IntervalError> {
        let to = self.to.unwrap_or(today);
        let from = self.from.unwrap_or(to);
        Interval::new(from, to)
    }
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("Not a date: {value}"))
}

fn parse_account(value: &str) -> Result<AccountConfig, String> {
    let (name, history_file) = value
        .split_once('=')
        .ok_or_else(|| format!("Expected NAME=HISTORY_CSV but got {value}"))?;
    let name = name.trim();
    if name.is_empty() || history_file.trim().is_empty() {
        return Err(format!("Expected NAME=HISTORY_CSV but got {value}"));
    }
    Ok(AccountConfig {
        name: name.to_string(),
        history_file: PathBuf::from(history_file.trim()),
    })
}

pub fn parse() -> Args {
    Args::parse()
}
