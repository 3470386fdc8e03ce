use rust_decimal::Decimal;
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    ops::Deref,
};
use time::Date;

use crate::{Cost, Posting, PriceMap};

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Position {
    pub currency: String,
    pub units: Decimal,
    pub cost: Option<Cost>,
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.units, &self.currency)?;
        if let Some(cost) = self.cost.as_ref() {
            write!(f, " {cost}")?;
        }
        Ok(())
    }
}

/// The holdings of an account, as positions sorted by currency,
/// with the position without cost ahead of those at cost, which are sorted by cost.
///
/// Positions are unique with respect to currency and cost, and never empty.
#[derive(PartialEq, Eq, Default, Clone, Debug)]
pub struct Inventory(Vec<Position>);

impl Display for Inventory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, p) in self.0.iter().enumerate() {
            write!(f, "{}{}", if i > 0 { ", " } else { "" }, p)?;
        }
        Ok(())
    }
}

impl Deref for Inventory {
    type Target = Vec<Position>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Inventory {
    /// Total units of `currency`, regardless of cost.
    pub fn currency_units(&self, currency: &str) -> Decimal {
        self.0
            .iter()
            .filter(|p| p.currency == currency)
            .map(|p| p.units)
            .sum()
    }

    pub fn accumulate(&mut self, units: Decimal, currency: &str, cost: Option<Cost>) {
        use Ordering::*;

        if units.is_zero() {
            return;
        }

        let insertion_idx =
            self.0
                .binary_search_by(|existing| match existing.currency.as_str().cmp(currency) {
                    ordering @ (Less | Greater) => ordering,
                    Equal => match (&existing.cost, &cost) {
                        (None, None) => Equal,
                        (Some(_), None) => Greater,
                        (None, Some(_)) => Less,
                        (Some(existing_cost), Some(cost)) => existing_cost.cmp(cost),
                    },
                });

        match insertion_idx {
            Ok(i) => {
                let position = &mut self.0[i];
                tracing::debug!("augmenting position {} with {}", &position, units);
                position.units += units;
                if position.units.is_zero() {
                    self.0.remove(i);
                }
            }
            Err(i) => {
                let position = Position {
                    units,
                    currency: currency.to_string(),
                    cost,
                };
                tracing::debug!("inserting new position {} at {i}", &position);
                self.0.insert(i, position)
            }
        }
    }

    pub fn add_position(&mut self, posting: &Posting) {
        self.accumulate(posting.units, &posting.currency, posting.cost.clone());
    }

    /// Market value of the whole inventory in `target` as of `date`.
    ///
    /// Positions at cost which have no direct rate are converted via their cost currency.
    /// Positions which cannot be converted at all contribute nothing.
    pub fn value_in(&self, target: &str, prices: &PriceMap, date: Date) -> Decimal {
        self.0
            .iter()
            .filter_map(|position| {
                let via = position.cost.as_ref().map(|cost| cost.currency.as_str());
                let value = prices.convert(position.units, &position.currency, target, via, date);
                if value.is_none() {
                    tracing::debug!("{date} no rate for {} in {target}", &position);
                }
                value
            })
            .sum()
    }
}

impl FromIterator<Position> for Inventory {
    fn from_iter<T: IntoIterator<Item = Position>>(iter: T) -> Self {
        let mut inventory = Inventory::default();
        for Position {
            currency,
            units,
            cost,
        } in iter
        {
            inventory.accumulate(units, &currency, cost);
        }
        inventory
    }
}
