use beancount_parser_lima as parser;
use hashbrown::HashMap;
use std::cmp::Ordering;
use time::Date;

use crate::{
    Booking,
    defaults::{
        default_name_assets, default_name_equity, default_name_expenses, default_name_income,
        default_name_liabilities,
    },
};

/// An account known to the ledger through its open and/or close directive.
#[derive(Clone, Debug)]
pub struct Account {
    pub name: String,
    pub open: Option<Open>,
    pub close: Option<Close>,
}

#[derive(Clone, Debug)]
pub struct Open {
    pub date: Date,
    /// Values of those metadata keys requested at load time which were present.
    pub metadata: HashMap<String, String>,
    pub booking: Booking,
}

#[derive(Clone, Debug)]
pub struct Close {
    pub date: Date,
}

impl Account {
    /// Value for the first of `keys` present in the open directive's metadata.
    pub fn metadata_value<'s, I>(&self, keys: I) -> Option<&str>
    where
        I: IntoIterator<Item = &'s str>,
    {
        let open = self.open.as_ref()?;
        keys.into_iter()
            .find_map(|key| open.metadata.get(key).map(String::as_str))
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
pub enum AccountType {
    Assets,
    Liabilities,
    Equity,
    Income,
    Expenses,
}

/// Root account names for each account type.
#[derive(Clone, Debug)]
pub struct AccountTypes {
    pub assets: String,
    pub liabilities: String,
    pub equity: String,
    pub income: String,
    pub expenses: String,
}

impl Default for AccountTypes {
    fn default() -> Self {
        Self {
            assets: default_name_assets().to_string(),
            liabilities: default_name_liabilities().to_string(),
            equity: default_name_equity().to_string(),
            income: default_name_income().to_string(),
            expenses: default_name_expenses().to_string(),
        }
    }
}

impl<'a> From<&parser::Options<'a>> for AccountTypes {
    fn from(options: &parser::Options<'a>) -> Self {
        let name =
            |account_type: parser::AccountType| owned(&options.account_type_name(account_type));

        Self {
            assets: name(parser::AccountType::Assets),
            liabilities: name(parser::AccountType::Liabilities),
            equity: name(parser::AccountType::Equity),
            income: name(parser::AccountType::Income),
            expenses: name(parser::AccountType::Expenses),
        }
    }
}

impl AccountTypes {
    pub fn account_type(&self, account: &str) -> Option<AccountType> {
        use AccountType::*;

        let root = account.split(':').next()?;
        [
            (&self.assets, Assets),
            (&self.liabilities, Liabilities),
            (&self.equity, Equity),
            (&self.income, Income),
            (&self.expenses, Expenses),
        ]
        .into_iter()
        .find_map(|(name, account_type)| (name == root).then_some(account_type))
    }

    pub fn is_account_type(&self, account_type: AccountType, account: &str) -> bool {
        self.account_type(account) == Some(account_type)
    }

    /// Canonical ordering: by account type, then by full name.
    pub fn cmp_accounts(&self, a: &str, b: &str) -> Ordering {
        self.account_type(a)
            .cmp(&self.account_type(b))
            .then_with(|| a.cmp(b))
    }
}

fn owned<S>(s: &S) -> String
where
    S: AsRef<str> + ?Sized,
{
    s.as_ref().to_string()
}

#[cfg(test)]
mod tests;
