use hashbrown::HashMap;
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Booking, BookingError, Cost, Inventory, Position, Posting, PostingBookingError, Price,
    TransactionBookingError,
};

/// A posting as written, with any of its numbers possibly missing.
#[derive(Clone, Debug)]
pub(crate) struct PostingSpec {
    pub(crate) account: String,
    pub(crate) units: Option<Decimal>,
    pub(crate) currency: Option<String>,
    pub(crate) cost: Option<CostSpec>,
    pub(crate) price: Option<PriceSpec>,
}

#[derive(Clone, Default, Debug)]
pub(crate) struct CostSpec {
    pub(crate) per_unit: Option<Decimal>,
    pub(crate) total: Option<Decimal>,
    pub(crate) currency: Option<String>,
    pub(crate) date: Option<Date>,
    pub(crate) label: Option<String>,
}

impl CostSpec {
    fn matches(&self, cost: &Cost) -> bool {
        self.per_unit.is_none_or(|per_unit| per_unit == cost.per_unit)
            && self
                .currency
                .as_ref()
                .is_none_or(|currency| *currency == cost.currency)
            && self.date.is_none_or(|date| date == cost.date)
            && self
                .label
                .as_ref()
                .is_none_or(|label| Some(label) == cost.label.as_ref())
    }

    /// The cost of a new lot, which must be fully specified apart from its date.
    fn augmentation(&self, date: Date, units: Decimal) -> Result<Cost, PostingBookingError> {
        use PostingBookingError::*;

        let currency = self.currency.clone().ok_or(CannotInferCost)?;
        let total_per_unit = |total: Decimal| total.checked_div(units.abs()).ok_or(CannotInferCost);
        let per_unit = match (self.per_unit, self.total) {
            (Some(per_unit), None) => per_unit,
            (None, Some(total)) => total_per_unit(total)?,
            (Some(per_unit), Some(total)) => per_unit + total_per_unit(total)?,
            (None, None) => return Err(CannotInferCost),
        };

        Ok(Cost {
            date: self.date.unwrap_or(date),
            per_unit,
            currency,
            label: self.label.clone(),
        })
    }
}

#[derive(Clone, Default, Debug)]
pub(crate) struct PriceSpec {
    pub(crate) per_unit: Option<Decimal>,
    pub(crate) total: Option<Decimal>,
    pub(crate) currency: Option<String>,
}

impl PriceSpec {
    fn resolve(&self, units: Decimal) -> Result<Price, PostingBookingError> {
        use PostingBookingError::*;

        let currency = self.currency.clone().ok_or(CannotInferPriceCurrency)?;
        let per_unit = match (self.per_unit, self.total) {
            (Some(per_unit), _) => per_unit,
            (None, Some(total)) => total.checked_div(units.abs()).ok_or(CannotInferPrice)?,
            (None, None) => return Err(CannotInferPrice),
        };

        Ok(Price { per_unit, currency })
    }
}

#[derive(Debug)]
pub(crate) struct Bookings {
    pub(crate) postings: Vec<Posting>,
    pub(crate) updated_inventory: HashMap<String, Inventory>,
}

/// Book the postings of a transaction dated `date` against the inventory of each account.
///
/// Reductions at cost are matched against existing lots according to the account's booking method,
/// and a reduction spanning several lots becomes one posting per lot.
/// A single posting without units is interpolated from the residual of the others,
/// with one posting for each currency left unbalanced.
pub(crate) fn book<'b, I, M>(
    date: Date,
    specs: &[PostingSpec],
    inventory: I,
    method: M,
) -> Result<Bookings, BookingError>
where
    I: Fn(&str) -> Option<&'b Inventory>,
    M: Fn(&str) -> Booking,
{
    use hashbrown::hash_map::EntryRef::*;

    let mut updated_inventory = HashMap::<String, Inventory>::default();
    let mut postings = Vec::default();
    let mut auto_post = None;

    for (idx, spec) in specs.iter().enumerate() {
        let posting_error = |e| BookingError::Posting(idx, e);

        let Some(units) = spec.units else {
            if auto_post.replace(spec).is_some() {
                return Err(BookingError::Transaction(
                    TransactionBookingError::AmbiguousAutoPost,
                ));
            }
            continue;
        };

        let currency = spec
            .currency
            .as_deref()
            .ok_or(PostingBookingError::CannotInferCurrency)
            .map_err(posting_error)?;

        let price = spec
            .price
            .as_ref()
            .map(|price| price.resolve(units))
            .transpose()
            .map_err(posting_error)?;

        let positions = match updated_inventory.entry_ref(spec.account.as_str()) {
            Occupied(entry) => entry.into_mut(),
            Vacant(entry) => entry.insert(inventory(&spec.account).cloned().unwrap_or_default()),
        };

        let lots = match &spec.cost {
            None => vec![(units, None)],
            Some(cost_spec) => {
                let account_method = method(&spec.account);

                if account_method != Booking::None
                    && is_potential_reduction(units, currency, positions)
                {
                    reduce(units, currency, cost_spec, positions, account_method)
                        .map_err(posting_error)?
                        .into_iter()
                        .map(|(units, cost)| (units, Some(cost)))
                        .collect::<Vec<_>>()
                } else {
                    let cost = cost_spec.augmentation(date, units).map_err(posting_error)?;
                    vec![(units, Some(cost))]
                }
            }
        };

        for (units, cost) in lots {
            positions.accumulate(units, currency, cost.clone());
            postings.push(Posting {
                account: spec.account.clone(),
                units,
                currency: currency.to_string(),
                cost,
                price: price.clone(),
            });
        }
    }

    if let Some(spec) = auto_post {
        let mut residuals = HashMap::<&str, Decimal>::default();
        for posting in &postings {
            let (weight, currency) = posting.weight();
            *residuals.entry(currency).or_default() += weight;
        }

        let mut residuals = residuals
            .into_iter()
            .filter(|(_, residual)| !residual.is_zero())
            .map(|(currency, residual)| (currency.to_string(), residual))
            .collect::<Vec<_>>();
        residuals.sort();

        tracing::debug!("{date} interpolating {} from {:?}", &spec.account, &residuals);

        let positions = match updated_inventory.entry_ref(spec.account.as_str()) {
            Occupied(entry) => entry.into_mut(),
            Vacant(entry) => entry.insert(inventory(&spec.account).cloned().unwrap_or_default()),
        };

        for (currency, residual) in residuals {
            positions.accumulate(-residual, &currency, None);
            postings.push(Posting {
                account: spec.account.clone(),
                units: -residual,
                currency,
                cost: None,
                price: None,
            });
        }
    }

    Ok(Bookings {
        postings,
        updated_inventory,
    })
}

// do any positions at cost in this currency have a sign opposite to ours?
fn is_potential_reduction(units: Decimal, currency: &str, positions: &Inventory) -> bool {
    !units.is_zero()
        && positions
            .iter()
            .filter(|pos| pos.currency == currency && pos.cost.is_some())
            .any(|pos| pos.units.is_sign_negative() != units.is_sign_negative())
}

/// Choose the lots to reduce, returning the signed units taken from each.
fn reduce(
    units: Decimal,
    currency: &str,
    cost_spec: &CostSpec,
    positions: &Inventory,
    method: Booking,
) -> Result<Vec<(Decimal, Cost)>, PostingBookingError> {
    use Booking::*;
    use PostingBookingError::*;

    // positions are already in cost order, which puts the oldest lot first
    let mut matched = positions
        .iter()
        .filter(|pos| {
            pos.currency == currency
                && pos.units.is_sign_negative() != units.is_sign_negative()
                && pos.cost.as_ref().is_some_and(|cost| cost_spec.matches(cost))
        })
        .collect::<Vec<_>>();

    tracing::debug!("reduce {method} {units} {currency} matched {:?}", &matched);

    if matched.is_empty() {
        return Err(NoPositionMatches);
    }

    let wanted = units.abs();
    let available = matched.iter().map(|pos| pos.units.abs()).sum::<Decimal>();

    match method {
        Strict | StrictWithSize | Average | None => {
            if matched.len() > 1 && wanted != available {
                let exact_size = (method == StrictWithSize)
                    .then(|| matched.iter().position(|pos| pos.units.abs() == wanted))
                    .flatten();

                match exact_size {
                    Some(i) => matched = vec![matched[i]],
                    Option::None => return Err(AmbiguousMatches),
                }
            }
        }
        Fifo => {}
        Lifo => matched.reverse(),
        Hifo => matched.sort_by_key(|pos| {
            std::cmp::Reverse(pos.cost.as_ref().map(|cost| cost.per_unit))
        }),
    }

    let mut remaining = wanted;
    let mut reductions = Vec::default();
    for Position {
        units: lot_units,
        cost,
        ..
    } in matched
    {
        if remaining.is_zero() {
            break;
        }

        let taken = remaining.min(lot_units.abs());
        remaining -= taken;

        if let Some(cost) = cost {
            reductions.push((if units.is_sign_negative() { -taken } else { taken }, cost.clone()));
        }
    }

    if remaining.is_zero() {
        Ok(reductions)
    } else {
        Err(NotEnoughLotsToReduce)
    }
}
