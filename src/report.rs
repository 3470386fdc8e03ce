use color_eyre::eyre::Result;
use fbar_ledger::{Account, Ledger, defaults::default_account_number_key};
use rust_decimal::Decimal;
use std::io::{BufWriter, Write};
use time::Date;

use crate::{
    select::select_accounts,
    walk::{DailyBalances, start_of_year_inventory},
};

/// What to report and how.
#[derive(Debug)]
pub(crate) struct ReportOptions {
    pub(crate) year: i32,
    pub(crate) only_accounts: Vec<String>,
    pub(crate) metadata_keys: Vec<String>,
    pub(crate) currency: String,
}

/// Write one line for each selected account, with its maximum value during the year
/// and its identifier.
pub(crate) fn write_report<W>(ledger: &Ledger, options: &ReportOptions, out_w: W) -> Result<()>
where
    W: Write,
{
    let ReportOptions {
        year,
        only_accounts,
        metadata_keys,
        currency,
    } = options;

    let mut out_w = BufWriter::new(out_w);
    let postings_by_account = ledger.postings_by_account();

    for account in select_accounts(
        ledger.accounts(),
        ledger.account_types(),
        *year,
        only_accounts,
    ) {
        let postings = postings_by_account
            .get(account.name.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut inventory = start_of_year_inventory(postings, *year)?;
        let maximum = yearly_maximum(DailyBalances::new(
            *year,
            postings,
            &mut inventory,
            ledger.prices(),
            currency,
        )?);

        tracing::debug!("{} maximum {maximum} {currency}", &account.name);

        writeln!(
            out_w,
            "{} {} {}",
            &account.name,
            format_amount(maximum, currency),
            account_identifier(account, metadata_keys)
        )?;
    }

    out_w.flush()?;

    Ok(())
}

/// Largest of the daily values, each truncated to whole units, and never less than zero.
pub(crate) fn yearly_maximum<I>(balances: I) -> Decimal
where
    I: IntoIterator<Item = (Date, Decimal)>,
{
    balances
        .into_iter()
        .map(|(_, value)| value.trunc())
        .fold(Decimal::ZERO, Decimal::max)
}

/// The default account number key, followed by `extra` keys not already present.
pub(crate) fn account_number_keys<I>(extra: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut keys = vec![default_account_number_key().to_string()];
    for key in extra {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

pub(crate) fn account_identifier<'a>(account: &'a Account, metadata_keys: &[String]) -> &'a str {
    account
        .metadata_value(metadata_keys.iter().map(String::as_str))
        .unwrap_or_default()
}

/// Whole units with thousands separators, as `$1,234` for dollars or `1,234 EUR` otherwise.
pub(crate) fn format_amount(amount: Decimal, currency: &str) -> String {
    let amount = amount.trunc();
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    let whole = amount.abs().normalize().to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if currency == "USD" {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}{grouped} {currency}")
    }
}
