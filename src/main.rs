use color_eyre::eyre::Result;
use fbar_ledger::{Ledger, defaults::default_reporting_currency};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use clap::Parser;

use crate::report::{ReportOptions, account_number_keys, write_report};

/// Summarise the maximum value of each asset account during a year, for FinCEN Form 114 (FBAR)
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Beancount file path
    beanpath: PathBuf,

    /// Which year to summarise
    #[clap(long)]
    year: i32,

    /// Only calculate for the specified account(s)
    #[clap(long = "only-account", value_name = "ACCOUNT")]
    only_accounts: Vec<String>,

    /// Further metadata key(s) containing account numbers, searched in order after account-number
    #[clap(long = "meta-account-number", value_name = "KEY")]
    metadata_keys: Vec<String>,

    /// Currency in which to value accounts
    #[clap(long, default_value = default_reporting_currency())]
    currency: String,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let out_w = &std::io::stdout();
    let error_w = &std::io::stderr();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let Cli {
        beanpath,
        year,
        only_accounts,
        metadata_keys,
        currency,
    } = Cli::parse();
    let metadata_keys = account_number_keys(metadata_keys);

    let ledger = Ledger::load_from(&beanpath, &metadata_keys, error_w)?;

    write_report(
        &ledger,
        &ReportOptions {
            year,
            only_accounts,
            metadata_keys,
            currency,
        },
        out_w,
    )
}

pub(crate) mod report;
pub(crate) mod select;
pub(crate) mod walk;
