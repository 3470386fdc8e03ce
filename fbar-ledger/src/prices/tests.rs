use rstest::rstest;
use rust_decimal_macros::dec;
use time::macros::date;

use super::*;

fn quote(date: Date, base: &str, quote: &str, rate: Decimal) -> Quote {
    Quote {
        date,
        base: base.to_string(),
        quote: quote.to_string(),
        rate,
    }
}

fn eur_usd() -> PriceMap {
    [
        quote(date!(2021 - 01 - 01), "EUR", "USD", dec!(1.20)),
        quote(date!(2021 - 06 - 01), "EUR", "USD", dec!(1.25)),
        quote(date!(2021 - 03 - 01), "EUR", "USD", dec!(1.10)),
    ]
    .into_iter()
    .collect::<PriceMap>()
}

#[rstest]
#[case(date!(2020 - 12 - 31), None)]
#[case(date!(2021 - 01 - 01), Some(dec!(1.20)))]
#[case(date!(2021 - 02 - 28), Some(dec!(1.20)))]
#[case(date!(2021 - 03 - 01), Some(dec!(1.10)))]
#[case(date!(2021 - 05 - 31), Some(dec!(1.10)))]
#[case(date!(2022 - 12 - 31), Some(dec!(1.25)))]
fn latest_rate_on_or_before(#[case] date: Date, #[case] expected: Option<Decimal>) {
    assert_eq!(eur_usd().rate("EUR", "USD", date), expected);
}

#[test]
fn inverse_rates_are_derived() {
    let prices = eur_usd();
    assert_eq!(
        prices.rate("USD", "EUR", date!(2021 - 07 - 01)),
        Some(Decimal::ONE / dec!(1.25))
    );
    assert_eq!(prices.rate("USD", "EUR", date!(2020 - 07 - 01)), None);
}

#[test]
fn same_currency_is_unity() {
    assert_eq!(
        PriceMap::default().rate("USD", "USD", date!(1970 - 01 - 01)),
        Some(Decimal::ONE)
    );
}

#[test]
fn last_rate_for_a_date_wins() {
    let prices = [
        quote(date!(2021 - 01 - 01), "GBP", "USD", dec!(1.30)),
        quote(date!(2021 - 01 - 01), "GBP", "USD", dec!(1.35)),
    ]
    .into_iter()
    .collect::<PriceMap>();

    assert_eq!(
        prices.rate("GBP", "USD", date!(2021 - 01 - 01)),
        Some(dec!(1.35))
    );
}

#[test]
fn rates_quoted_in_both_directions_are_merged() {
    let prices = [
        quote(date!(2021 - 01 - 01), "USD", "NZD", dec!(2)),
        quote(date!(2021 - 02 - 01), "NZD", "USD", dec!(0.25)),
    ]
    .into_iter()
    .collect::<PriceMap>();

    assert_eq!(
        prices.rate("NZD", "USD", date!(2021 - 01 - 15)),
        Some(dec!(0.5))
    );
    assert_eq!(
        prices.rate("NZD", "USD", date!(2021 - 02 - 15)),
        Some(dec!(0.25))
    );
    assert_eq!(prices.rate("USD", "NZD", date!(2021 - 02 - 15)), Some(dec!(4)));
}

#[test]
fn convert_via_cost_currency() {
    let prices = [
        quote(date!(2021 - 01 - 01), "HOOL", "EUR", dec!(100)),
        quote(date!(2021 - 01 - 01), "EUR", "USD", dec!(1.20)),
    ]
    .into_iter()
    .collect::<PriceMap>();
    let date = date!(2021 - 06 - 30);

    assert_eq!(prices.convert(dec!(3), "HOOL", "USD", None, date), None);
    assert_eq!(
        prices.convert(dec!(3), "HOOL", "USD", Some("EUR"), date),
        Some(dec!(360.00))
    );
    assert_eq!(prices.convert(dec!(3), "HOOL", "USD", Some("USD"), date), None);
}
