// Beancount's own defaults, for what the ledger doesn't override

pub fn default_name_assets() -> &'static str {
    "Assets"
}

pub fn default_name_liabilities() -> &'static str {
    "Liabilities"
}

pub fn default_name_equity() -> &'static str {
    "Equity"
}

pub fn default_name_income() -> &'static str {
    "Income"
}

pub fn default_name_expenses() -> &'static str {
    "Expenses"
}

/// Metadata key on the open directive holding the account number.
pub fn default_account_number_key() -> &'static str {
    "account-number"
}

pub fn default_reporting_currency() -> &'static str {
    "USD"
}
