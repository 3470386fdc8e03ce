use beancount_parser_lima::BeancountSources;
use fbar_ledger::Ledger;
use rstest::rstest;
use rust_decimal_macros::dec;
use time::macros::date;

use super::*;

fn load(source: &str) -> Ledger {
    let sources = BeancountSources::from(source);
    Ledger::load_sources(&sources, &[], &std::io::stderr()).unwrap()
}

fn walk(ledger: &Ledger, account: &str, year: i32) -> Vec<(Date, Decimal)> {
    let by_account = ledger.postings_by_account();
    let postings = by_account.get(account).cloned().unwrap_or_default();
    let mut inventory = start_of_year_inventory(&postings, year).unwrap();

    DailyBalances::new(year, &postings, &mut inventory, ledger.prices(), "USD")
        .unwrap()
        .collect()
}

const DEPOSITS: &str = r#"
2020-01-01 open Assets:Bank
2020-01-01 open Income:Salary

2020-06-01 * "Before"
  Assets:Bank  500 USD
  Income:Salary

2021-03-01 * "During"
  Assets:Bank  1000 USD
  Income:Salary

2021-12-31 * "Last day"
  Assets:Bank  1 USD
  Income:Salary

2022-01-01 * "After"
  Assets:Bank  9000 USD
  Income:Salary
"#;

#[rstest]
#[case::common(2021, 365)]
#[case::leap(2020, 366)]
fn walks_every_day_of_year(#[case] year: i32, #[case] days: usize) {
    let ledger = load(DEPOSITS);
    let dates = walk(&ledger, "Assets:Bank", year)
        .into_iter()
        .map(|(date, _)| date)
        .collect::<Vec<_>>();

    assert_eq!(dates.len(), days);
    assert_eq!(dates.first(), Date::from_calendar_date(year, Month::January, 1).ok().as_ref());
    assert_eq!(dates.last(), Date::from_calendar_date(year, Month::December, 31).ok().as_ref());
    assert!(dates.windows(2).all(|pair| pair[0].next_day() == Some(pair[1])));
}

#[test]
fn start_of_year_excludes_the_year() {
    let ledger = load(DEPOSITS);
    let by_account = ledger.postings_by_account();

    let inventory = start_of_year_inventory(&by_account["Assets:Bank"], 2021).unwrap();

    assert_eq!(inventory.currency_units("USD"), dec!(500));
}

#[test]
fn postings_apply_from_their_date() {
    let ledger = load(DEPOSITS);
    let values = walk(&ledger, "Assets:Bank", 2021);

    let value_on = |date: Date| {
        values
            .iter()
            .find_map(|(d, value)| (*d == date).then_some(*value))
    };

    assert_eq!(value_on(date!(2021 - 01 - 01)), Some(dec!(500)));
    assert_eq!(value_on(date!(2021 - 02 - 28)), Some(dec!(500)));
    assert_eq!(value_on(date!(2021 - 03 - 01)), Some(dec!(1500)));
    assert_eq!(value_on(date!(2021 - 12 - 30)), Some(dec!(1500)));
    // the posting on the year boundary is included, the one after it is not
    assert_eq!(value_on(date!(2021 - 12 - 31)), Some(dec!(1501)));
}

#[test]
fn no_postings_is_all_zero() {
    let ledger = load(DEPOSITS);
    let values = walk(&ledger, "Assets:Nowhere", 2021);

    assert_eq!(values.len(), 365);
    assert!(values.iter().all(|(_, value)| value.is_zero()));
}

#[test]
fn converts_at_latest_price() {
    let ledger = load(
        r#"
2020-01-01 open Assets:Bank:EU
2020-01-01 open Equity:Opening

2020-12-01 price EUR 1.10 USD
2021-07-01 price EUR 1.30 USD

2020-12-15 * "Opening"
  Assets:Bank:EU  100 EUR
  Equity:Opening
"#,
    );
    let values = walk(&ledger, "Assets:Bank:EU", 2021);

    assert_eq!(values[0].1, dec!(110));
    assert_eq!(values[181], (date!(2021 - 07 - 01), dec!(130)));
    assert_eq!(values[364].1, dec!(130));
}

#[test]
fn pad_postings_are_walked() {
    let ledger = load(
        r#"
2020-01-01 open Assets:Bank
2020-01-01 open Equity:Opening

2021-02-01 pad Assets:Bank Equity:Opening
2021-03-01 balance Assets:Bank  250 USD
"#,
    );
    let values = walk(&ledger, "Assets:Bank", 2021);

    assert_eq!(values[30], (date!(2021 - 01 - 31), dec!(0)));
    assert_eq!(values[31], (date!(2021 - 02 - 01), dec!(250)));
}
