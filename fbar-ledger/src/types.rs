use beancount_parser_lima as parser;
use rust_decimal::Decimal;
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};
use strum_macros::Display;
use time::Date;

/// The cost of a single lot, as booked.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Cost {
    pub date: Date,
    pub per_unit: Decimal,
    pub currency: String,
    pub label: Option<String>,
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {} {}", &self.date, &self.per_unit, &self.currency)?;

        if let Some(label) = &self.label {
            write!(f, ", \"{label}\"")?;
        }

        f.write_str("}")
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.date.cmp(&other.date) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match self.currency.cmp(&other.currency) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match self.per_unit.cmp(&other.per_unit) {
            Ordering::Equal => {}
            ord => return ord,
        }

        self.label.cmp(&other.label)
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Price {
    pub per_unit: Decimal,
    pub currency: String,
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "@ {} {}", &self.per_unit, &self.currency)
    }
}

/// A booked posting, with all amounts known and any cost resolved to a single lot.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Posting {
    pub account: String,
    pub units: Decimal,
    pub currency: String,
    pub cost: Option<Cost>,
    pub price: Option<Price>,
}

impl Posting {
    /// The amount this posting contributes to the balance of its transaction, with its currency.
    pub fn weight(&self) -> (Decimal, &str) {
        if let Some(cost) = &self.cost {
            (self.units * cost.per_unit, cost.currency.as_str())
        } else if let Some(price) = &self.price {
            (self.units * price.per_unit, price.currency.as_str())
        } else {
            (self.units, self.currency.as_str())
        }
    }
}

impl Display for Posting {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", &self.account, self.units, &self.currency)?;
        if let Some(cost) = &self.cost {
            write!(f, " {cost}")?;
        }
        if let Some(price) = &self.price {
            write!(f, " {price}")?;
        }
        Ok(())
    }
}

/// The booking method for an account.
#[derive(PartialEq, Eq, Default, Clone, Copy, Display, Debug)]
pub enum Booking {
    #[default]
    Strict,
    StrictWithSize,
    None,
    Average,
    Fifo,
    Lifo,
    Hifo,
}

pub fn is_supported_method(method: Booking) -> bool {
    use Booking::*;

    match method {
        Strict | StrictWithSize | None | Fifo | Lifo | Hifo => true,
        Average => false,
    }
}

impl From<parser::Booking> for Booking {
    fn from(value: parser::Booking) -> Self {
        use Booking::*;
        use parser::Booking as parser;

        match value {
            parser::Strict => Strict,
            parser::StrictWithSize => StrictWithSize,
            parser::None => None,
            parser::Average => Average,
            parser::Fifo => Fifo,
            parser::Lifo => Lifo,
            parser::Hifo => Hifo,
        }
    }
}
