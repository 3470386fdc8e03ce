use fbar_ledger::{Account, AccountType, AccountTypes};

/// Asset accounts which were open at some point during `year`, in canonical order.
///
/// If `only` is not empty, accounts not named there are dropped.
pub(crate) fn select_accounts<'l>(
    accounts: &'l [Account],
    account_types: &AccountTypes,
    year: i32,
    only: &[String],
) -> Vec<&'l Account> {
    let mut selected = accounts
        .iter()
        .filter(|account| account_types.is_account_type(AccountType::Assets, &account.name))
        .filter(|account| only.is_empty() || only.contains(&account.name))
        .filter(|account| is_active_in(account, year))
        .collect::<Vec<_>>();

    selected.sort_by(|a, b| account_types.cmp_accounts(&a.name, &b.name));

    tracing::debug!(
        "selected {} of {} accounts for {year}",
        selected.len(),
        accounts.len()
    );

    selected
}

// missing open or close is unbounded
fn is_active_in(account: &Account, year: i32) -> bool {
    account
        .open
        .as_ref()
        .is_none_or(|open| open.date.year() <= year)
        && account
            .close
            .as_ref()
            .is_none_or(|close| year <= close.date.year())
}

#[cfg(test)]
mod tests;
