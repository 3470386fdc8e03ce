use color_eyre::eyre::{Result, WrapErr};
use fbar_ledger::{AccountPosting, Inventory, PriceMap};
use rust_decimal::Decimal;
use time::{Date, Month};

fn first_day(year: i32) -> Result<Date> {
    Date::from_calendar_date(year, Month::January, 1).wrap_err(format!("invalid year {year}"))
}

/// The net effect of all `postings` dated before the start of `year`.
///
/// Postings must be in date order.
pub(crate) fn start_of_year_inventory(
    postings: &[AccountPosting<'_>],
    year: i32,
) -> Result<Inventory> {
    let start = first_day(year)?;
    let mut inventory = Inventory::default();

    for posting in postings.iter().take_while(|posting| posting.date() < start) {
        posting.apply_to(&mut inventory);
    }

    Ok(inventory)
}

/// End of day value of an account for every day of a year.
///
/// Postings are merged in as the walk reaches their date, so each is applied exactly once,
/// and any dated after the end of the year are never applied.
#[derive(Debug)]
pub(crate) struct DailyBalances<'w, 'l> {
    postings: &'w [AccountPosting<'l>],
    next_posting: usize,
    inventory: &'w mut Inventory,
    prices: &'w PriceMap,
    currency: &'w str,
    date: Date,
    end: Date,
}

impl<'w, 'l> DailyBalances<'w, 'l> {
    /// Walk `year`, starting from `inventory` which must already hold everything before that year.
    pub(crate) fn new(
        year: i32,
        postings: &'w [AccountPosting<'l>],
        inventory: &'w mut Inventory,
        prices: &'w PriceMap,
        currency: &'w str,
    ) -> Result<Self> {
        let date = first_day(year)?;
        let end = first_day(year + 1)?;

        Ok(Self {
            postings,
            next_posting: postings.partition_point(|posting| posting.date() < date),
            inventory,
            prices,
            currency,
            date,
            end,
        })
    }
}

impl<'w, 'l> Iterator for DailyBalances<'w, 'l> {
    type Item = (Date, Decimal);

    fn next(&mut self) -> Option<Self::Item> {
        if self.date >= self.end {
            return None;
        }

        let date = self.date;
        while let Some(posting) = self
            .postings
            .get(self.next_posting)
            .filter(|posting| posting.date() <= date)
        {
            posting.apply_to(self.inventory);
            self.next_posting += 1;
        }

        let value = self.inventory.value_in(self.currency, self.prices, date);
        tracing::trace!("{date} {value} {} for {}", self.currency, &self.inventory);

        self.date = date.next_day().unwrap_or(self.end);

        Some((date, value))
    }
}

#[cfg(test)]
mod tests;
