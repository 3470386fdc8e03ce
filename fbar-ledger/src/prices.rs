use hashbrown::HashMap;
use rust_decimal::Decimal;
use time::Date;

/// A single observed exchange rate: one unit of `base` is worth `rate` units of `quote` on `date`.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Quote {
    pub date: Date,
    pub base: String,
    pub quote: String,
    pub rate: Decimal,
}

/// Historical rates between pairs of currencies, built once from the ledger.
///
/// Each pair is held in both directions, sorted by date with at most one rate per date,
/// so that a lookup is a binary search for the latest rate on or before the date of interest.
#[derive(Default, Debug)]
pub struct PriceMap {
    rates: HashMap<String, HashMap<String, Vec<(Date, Decimal)>>>,
}

impl PriceMap {
    /// Latest known rate from `base` to `quote` on or before `date`.
    pub fn rate(&self, base: &str, quote: &str, date: Date) -> Option<Decimal> {
        if base == quote {
            return Some(Decimal::ONE);
        }

        let history = self.rates.get(base)?.get(quote)?;
        let i = history.partition_point(|(d, _)| *d <= date);
        (i > 0).then(|| history[i - 1].1)
    }

    /// Convert `units` of `currency` into `target`, going through `via` if there is no direct rate.
    pub fn convert(
        &self,
        units: Decimal,
        currency: &str,
        target: &str,
        via: Option<&str>,
        date: Date,
    ) -> Option<Decimal> {
        self.rate(currency, target, date)
            .or_else(|| {
                let via = via.filter(|via| *via != target)?;
                Some(self.rate(currency, via, date)? * self.rate(via, target, date)?)
            })
            .map(|rate| units * rate)
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    fn insert(&mut self, base: &str, quote: &str, history: Vec<(Date, Decimal)>) {
        self.rates
            .entry_ref(base)
            .or_default()
            .insert(quote.to_string(), history);
    }
}

impl FromIterator<Quote> for PriceMap {
    fn from_iter<T: IntoIterator<Item = Quote>>(iter: T) -> Self {
        use hashbrown::hash_map::Entry::*;

        // rates for a pair are collected in whichever direction was seen first
        let mut pairs = HashMap::<(String, String), Vec<(Date, Decimal)>>::default();

        for Quote {
            date,
            base,
            quote,
            rate,
        } in iter
        {
            if base == quote {
                continue;
            }

            let inverse = (quote, base);
            if let Some(history) = pairs.get_mut(&inverse) {
                if let Some(inverted) = Decimal::ONE.checked_div(rate) {
                    history.push((date, inverted));
                }
                continue;
            }

            let (quote, base) = inverse;
            match pairs.entry((base, quote)) {
                Occupied(mut entry) => entry.get_mut().push((date, rate)),
                Vacant(entry) => {
                    entry.insert(vec![(date, rate)]);
                }
            }
        }

        let mut price_map = PriceMap::default();

        for ((base, quote), mut history) in pairs {
            // the last rate given for a date wins
            history.sort_by_key(|(date, _)| *date);
            let mut deduped: Vec<(Date, Decimal)> = Vec::with_capacity(history.len());
            for (date, rate) in history {
                match deduped.last_mut() {
                    Some(last) if last.0 == date => last.1 = rate,
                    _ => deduped.push((date, rate)),
                }
            }

            let inverted = deduped
                .iter()
                .filter_map(|(date, rate)| Decimal::ONE.checked_div(*rate).map(|r| (*date, r)))
                .collect::<Vec<_>>();

            tracing::debug!("price history {base}/{quote} has {} entries", deduped.len());

            price_map.insert(&base, &quote, deduped);
            price_map.insert(&quote, &base, inverted);
        }

        price_map
    }
}

#[cfg(test)]
mod tests;
