use rstest::rstest;
use time::macros::date;

use super::*;

#[rstest]
#[case("Assets:Bank:Checking", Some(AccountType::Assets))]
#[case("Liabilities:Card", Some(AccountType::Liabilities))]
#[case("Expenses:Food", Some(AccountType::Expenses))]
#[case("Assetsy:Bank", None)]
fn account_type_from_root(#[case] account: &str, #[case] expected: Option<AccountType>) {
    assert_eq!(AccountTypes::default().account_type(account), expected);
}

#[rstest]
#[case("Assets:A:C", "Assets:A-B", Ordering::Greater)]
#[case("Assets:A", "Assets:A:B", Ordering::Less)]
#[case("Assets:Z", "Liabilities:A", Ordering::Less)]
#[case("Income:A", "Equity:Z", Ordering::Greater)]
#[case("Assets:Bank", "Assets:Bank", Ordering::Equal)]
fn canonical_ordering(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
    assert_eq!(AccountTypes::default().cmp_accounts(a, b), expected);
}

#[test]
fn metadata_value_uses_first_key_present() {
    let account = Account {
        name: "Assets:Bank".to_string(),
        open: Some(Open {
            date: date!(2020 - 01 - 01),
            metadata: [("iban".to_string(), "GB00".to_string())]
                .into_iter()
                .collect(),
            booking: Booking::default(),
        }),
        close: None,
    };

    assert_eq!(
        account.metadata_value(["account-number", "iban"]),
        Some("GB00")
    );
    assert_eq!(account.metadata_value(["account-number"]), None);
}
