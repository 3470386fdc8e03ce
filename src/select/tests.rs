use fbar_ledger::{Booking, Close, Open};
use rstest::rstest;
use time::{Date, macros::date};

use super::*;

fn account(name: &str, open: Option<Date>, close: Option<Date>) -> Account {
    Account {
        name: name.to_string(),
        open: open.map(|date| Open {
            date,
            metadata: Default::default(),
            booking: Booking::default(),
        }),
        close: close.map(|date| Close { date }),
    }
}

fn names(accounts: &[&Account]) -> Vec<String> {
    accounts.iter().map(|account| account.name.clone()).collect()
}

#[rstest]
#[case::open_before(Some(date!(2019 - 05 - 01)), None, true)]
#[case::open_during(Some(date!(2021 - 12 - 31)), None, true)]
#[case::open_after(Some(date!(2022 - 01 - 01)), None, false)]
#[case::closed_during(Some(date!(2019 - 05 - 01)), Some(date!(2021 - 01 - 01)), true)]
#[case::closed_before(Some(date!(2019 - 05 - 01)), Some(date!(2020 - 12 - 31)), false)]
#[case::close_only(None, Some(date!(2030 - 01 - 01)), true)]
fn active_in_year(#[case] open: Option<Date>, #[case] close: Option<Date>, #[case] expected: bool) {
    let accounts = vec![account("Assets:Bank", open, close)];

    let selected = select_accounts(&accounts, &AccountTypes::default(), 2021, &[]);

    assert_eq!(selected.len() == 1, expected);
}

#[test]
fn only_assets_in_canonical_order() {
    let opened = Some(date!(2020 - 01 - 01));
    let accounts = vec![
        account("Assets:Bank-Two", opened, None),
        account("Assets:Bank:Checking", opened, None),
        account("Expenses:Food", opened, None),
        account("Liabilities:Card", opened, None),
        account("Assets:Bank", opened, None),
        account("Assetsy:Bogus", opened, None),
    ];

    let selected = select_accounts(&accounts, &AccountTypes::default(), 2021, &[]);

    assert_eq!(
        names(&selected),
        vec!["Assets:Bank", "Assets:Bank-Two", "Assets:Bank:Checking"]
    );
}

#[test]
fn allow_list_restricts_and_tolerates_unknown() {
    let opened = Some(date!(2020 - 01 - 01));
    let accounts = vec![
        account("Assets:Bank", opened, None),
        account("Assets:Broker", opened, None),
    ];
    let only = vec!["Assets:Broker".to_string(), "Assets:Nowhere".to_string()];

    let selected = select_accounts(&accounts, &AccountTypes::default(), 2021, &only);

    assert_eq!(names(&selected), vec!["Assets:Broker"]);
}
