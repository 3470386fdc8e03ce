use beancount_parser_lima as parser;

use crate::book::{CostSpec, PostingSpec, PriceSpec};

impl<'a, 'b> From<&'b parser::Posting<'a>> for PostingSpec {
    fn from(posting: &'b parser::Posting<'a>) -> Self {
        PostingSpec {
            account: owned(posting.account().item()),
            units: posting.amount().map(|amount| amount.item().value()),
            currency: posting.currency().map(|cur| cur.item().to_string()),
            cost: posting
                .cost_spec()
                .as_ref()
                .map(|cost_spec| cost_spec.item().into()),
            price: posting
                .price_annotation()
                .as_ref()
                .map(|price_spec| price_spec.item().into()),
        }
    }
}

impl<'a, 'b> From<&'b parser::CostSpec<'a>> for CostSpec {
    fn from(cost: &'b parser::CostSpec<'a>) -> Self {
        CostSpec {
            per_unit: cost.per_unit().map(|per_unit| per_unit.value()),
            total: cost.total().map(|total| total.value()),
            currency: cost.currency().map(|currency| currency.item().to_string()),
            date: cost.date().map(|date| *date.item()),
            label: cost.label().map(|label| owned(label.item())),
        }
    }
}

impl<'a, 'b> From<&'b parser::PriceSpec<'a>> for PriceSpec {
    fn from(price: &'b parser::PriceSpec<'a>) -> Self {
        use parser::PriceSpec::*;
        use parser::ScopedExprValue::*;

        let (amount, currency) = match price {
            BareCurrency(currency) => (None, Some(currency.to_string())),
            BareAmount(amount) => (Some(amount), None),
            CurrencyAmount(amount, currency) => (Some(amount), Some(currency.to_string())),
            _ => (None, None),
        };

        let (per_unit, total) = match amount {
            Some(PerUnit(expr)) => (Some(expr.value()), None),
            Some(Total(expr)) => (None, Some(expr.value())),
            _ => (None, None),
        };

        PriceSpec {
            per_unit,
            total,
            currency,
        }
    }
}

fn owned<S>(s: &S) -> String
where
    S: AsRef<str> + ?Sized,
{
    s.as_ref().to_string()
}
