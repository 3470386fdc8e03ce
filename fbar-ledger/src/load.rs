use beancount_parser_lima::{
    self as parser, BeancountParser, BeancountSources, ParseError, ParseSuccess, Span, Spanned,
};
use color_eyre::eyre::{Result, WrapErr, eyre};
use hashbrown::HashMap;
use rust_decimal::Decimal;
use std::{io::Write, path::Path};
use time::Date;

use crate::{
    Account, AccountTypes, Booking, Close, Inventory, Open, Posting, PriceMap, Quote,
    book::{Bookings, PostingSpec, book},
    is_supported_method,
    plugins::InternalPlugins,
};

#[derive(Clone, Debug)]
pub struct Transaction {
    pub date: Date,
    pub postings: Vec<Posting>,
}

/// A posting which carries its own date, rather than that of a transaction.
#[derive(Clone, Debug)]
pub struct DatedPosting {
    pub date: Date,
    pub posting: Posting,
}

/// A posting as it appears in the history of a single account.
#[derive(Clone, Copy, Debug)]
pub enum AccountPosting<'l> {
    /// Synthesized by a pad directive, and dated by the pad.
    Direct(&'l DatedPosting),
    /// A leg of a transaction, dated by the transaction.
    Linked {
        transaction: &'l Transaction,
        posting: &'l Posting,
    },
}

impl<'l> AccountPosting<'l> {
    pub fn date(&self) -> Date {
        use AccountPosting::*;

        match self {
            Direct(dated) => dated.date,
            Linked { transaction, .. } => transaction.date,
        }
    }

    pub fn posting(&self) -> &'l Posting {
        use AccountPosting::*;

        match self {
            Direct(dated) => &dated.posting,
            Linked { posting, .. } => posting,
        }
    }

    pub fn apply_to(&self, inventory: &mut Inventory) {
        inventory.add_position(self.posting())
    }
}

/// Everything of interest from a Beancount ledger, booked and ready for replaying.
#[derive(Debug)]
pub struct Ledger {
    account_types: AccountTypes,
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    paddings: Vec<DatedPosting>,
    prices: PriceMap,
}

impl Ledger {
    /// Load the ledger at `path`, keeping the open directive metadata named in `metadata_keys`.
    ///
    /// Parse errors are fatal.  Any directive which fails to load is reported and skipped.
    pub fn load_from<W>(path: &Path, metadata_keys: &[String], error_w: W) -> Result<Self>
    where
        W: Write + Copy,
    {
        let sources =
            BeancountSources::try_from(path).wrap_err(format!("failed to read {path:?}"))?;
        Self::load_sources(&sources, metadata_keys, error_w)
    }

    pub fn load_sources<W>(
        sources: &BeancountSources,
        metadata_keys: &[String],
        error_w: W,
    ) -> Result<Self>
    where
        W: Write + Copy,
    {
        let parser = BeancountParser::new(sources);

        match parser.parse() {
            Ok(ParseSuccess {
                directives,
                options,
                plugins,
                mut warnings,
            }) => {
                let internal_plugins = plugins.iter().collect::<InternalPlugins>();

                let default_booking = Booking::default();
                let default_booking_option = if let Some(booking_method) = options.booking_method()
                {
                    let booking = Into::<Booking>::into(*booking_method.item());
                    if is_supported_method(booking) {
                        booking
                    } else {
                        warnings.push(booking_method.warning(format!(
                            "Unsupported booking method, falling back to {default_booking}"
                        )));
                        default_booking
                    }
                } else {
                    default_booking
                };

                sources.write_errors_or_warnings(error_w, warnings)?;

                let LoadResult {
                    ledger,
                    errors,
                    warnings,
                } = Loader::new(
                    default_booking_option,
                    internal_plugins,
                    AccountTypes::from(&options),
                    metadata_keys,
                )
                .collect(&directives);

                if !warnings.is_empty() {
                    sources.write_errors_or_warnings(error_w, warnings)?;
                }
                if !errors.is_empty() {
                    sources.write_errors_or_warnings(error_w, errors)?;
                }

                Ok(ledger)
            }

            Err(ParseError { errors, warnings }) => {
                sources.write_errors_or_warnings(error_w, errors)?;
                sources.write_errors_or_warnings(error_w, warnings)?;
                Err(eyre!("parse error"))
            }
        }
    }

    /// Root account names, as configured by the ledger's options.
    pub fn account_types(&self) -> &AccountTypes {
        &self.account_types
    }

    /// All accounts with an open or close directive, sorted by name.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    #[cfg(test)]
    pub(crate) fn account(&self, name: &str) -> Option<&Account> {
        self.accounts
            .binary_search_by(|account| account.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.accounts[i])
    }

    #[cfg(test)]
    pub(crate) fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn prices(&self) -> &PriceMap {
        &self.prices
    }

    /// The postings for each account, in date order.
    pub fn postings_by_account(&self) -> HashMap<&str, Vec<AccountPosting<'_>>> {
        let mut by_account = HashMap::<&str, Vec<AccountPosting<'_>>>::default();

        for transaction in &self.transactions {
            for posting in &transaction.postings {
                by_account
                    .entry(posting.account.as_str())
                    .or_default()
                    .push(AccountPosting::Linked {
                        transaction,
                        posting,
                    });
            }
        }

        for dated in &self.paddings {
            by_account
                .entry(dated.posting.account.as_str())
                .or_default()
                .push(AccountPosting::Direct(dated));
        }

        for postings in by_account.values_mut() {
            postings.sort_by_key(AccountPosting::date);
        }

        by_account
    }
}

struct LoadResult {
    ledger: Ledger,
    errors: Vec<parser::AnnotatedError>,
    warnings: Vec<parser::AnnotatedWarning>,
}

#[derive(Debug)]
struct Loader<'a, 'k> {
    accounts: HashMap<String, AccountBuilder<'a>>,
    transactions: Vec<Transaction>,
    paddings: Vec<DatedPosting>,
    quotes: Vec<Quote>,
    internal_plugins: InternalPlugins,
    default_booking: Booking,
    account_types: AccountTypes,
    metadata_keys: &'k [String],
    errors: Vec<parser::AnnotatedError>,
    warnings: Vec<parser::AnnotatedWarning>,
}

impl<'a, 'k> Loader<'a, 'k> {
    fn new(
        default_booking: Booking,
        internal_plugins: InternalPlugins,
        account_types: AccountTypes,
        metadata_keys: &'k [String],
    ) -> Self {
        Self {
            accounts: HashMap::default(),
            transactions: Vec::default(),
            paddings: Vec::default(),
            quotes: Vec::default(),
            internal_plugins,
            default_booking,
            account_types,
            metadata_keys,
            errors: Vec::default(),
            warnings: Vec::default(),
        }
    }

    fn collect<I>(mut self, directives: I) -> LoadResult
    where
        I: IntoIterator<Item = &'a Spanned<parser::Directive<'a>>>,
    {
        let mut directives = directives.into_iter().collect::<Vec<_>>();
        directives.sort_by_key(|directive| (*directive.date().item(), rank(directive.variant())));

        for directive in directives {
            if let Err(e) = self.directive(directive) {
                self.errors.push(e);
            }
        }

        self.build()
    }

    fn build(self) -> LoadResult {
        let Self {
            accounts,
            transactions,
            paddings,
            quotes,
            internal_plugins,
            default_booking,
            account_types,
            mut errors,
            warnings,
            ..
        } = self;

        let mut accounts = accounts
            .into_iter()
            .filter_map(|(name, account)| {
                // pad directives must be followed by a balance
                if let Some(pad) = &account.pad {
                    errors.push(pad.directive.error("unused").into());
                }

                let open = account.open.or_else(|| {
                    (internal_plugins.auto_accounts && account.close.is_none())
                        .then_some(account.first_used)
                        .flatten()
                        .map(|date| Open {
                            date,
                            metadata: HashMap::default(),
                            booking: default_booking,
                        })
                });

                (open.is_some() || account.close.is_some()).then(|| Account {
                    name,
                    open,
                    close: account.close,
                })
            })
            .collect::<Vec<_>>();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));

        LoadResult {
            ledger: Ledger {
                account_types,
                accounts,
                transactions,
                paddings,
                prices: quotes.into_iter().collect(),
            },
            errors,
            warnings,
        }
    }

    fn directive(
        &mut self,
        directive: &'a Spanned<parser::Directive<'a>>,
    ) -> Result<(), parser::AnnotatedError> {
        use parser::DirectiveVariant as Variant;

        let date = *directive.date().item();

        match directive.variant() {
            Variant::Transaction(transaction) => self.transaction(transaction, date, directive),
            Variant::Price(price) => {
                self.price(price, date);
                Ok(())
            }
            Variant::Balance(balance) => self.balance(balance, date, directive),
            Variant::Open(open) => self.open(open, date, directive),
            Variant::Close(close) => self.close(close, date, directive),
            Variant::Pad(pad) => self.pad(pad, date, directive),
            _ => Ok(()),
        }
    }

    fn account_mut(&mut self, account_name: &str) -> &mut AccountBuilder<'a> {
        let default_booking = self.default_booking;
        self.accounts
            .entry_ref(account_name)
            .or_insert_with(|| AccountBuilder::new(default_booking))
    }

    fn transaction(
        &mut self,
        transaction: &'a parser::Transaction<'a>,
        date: Date,
        directive: &'a Spanned<parser::Directive<'a>>,
    ) -> Result<(), parser::AnnotatedError> {
        let specs = transaction
            .postings()
            .map(|posting| PostingSpec::from(posting.item()))
            .collect::<Vec<_>>();

        let Bookings {
            postings,
            updated_inventory,
        } = book(
            date,
            &specs,
            |account| self.accounts.get(account).map(|acc| &acc.positions),
            |account| {
                self.accounts
                    .get(account)
                    .map(|acc| acc.booking)
                    .unwrap_or(self.default_booking)
            },
        )
        .map_err(|e| {
            tracing::error!("booking error {}", &e);
            directive.error(e.to_string())
        })?;

        tracing::debug!("{date} booked {:?}", &postings);

        for (account_name, positions) in updated_inventory {
            let account = self.account_mut(&account_name);
            account.positions = positions;
            account.first_used.get_or_insert(date);
        }

        if self.internal_plugins.implicit_prices {
            for posting in &postings {
                let implied = posting
                    .price
                    .as_ref()
                    .map(|price| (price.per_unit, &price.currency))
                    .or_else(|| {
                        posting
                            .cost
                            .as_ref()
                            .map(|cost| (cost.per_unit, &cost.currency))
                    });

                if let Some((rate, quote)) = implied {
                    self.quotes.push(Quote {
                        date,
                        base: posting.currency.clone(),
                        quote: quote.clone(),
                        rate,
                    });
                }
            }
        }

        self.transactions.push(Transaction { date, postings });

        Ok(())
    }

    fn price(&mut self, price: &parser::Price, date: Date) {
        let amount = price.amount();

        self.quotes.push(Quote {
            date,
            base: owned(price.currency().item()),
            quote: owned(amount.currency().item()),
            rate: amount.number().value(),
        });
    }

    fn balance(
        &mut self,
        balance: &parser::Balance,
        date: Date,
        directive: &'a Spanned<parser::Directive<'a>>,
    ) -> Result<(), parser::AnnotatedError> {
        let account_name = owned(balance.account().item());
        let balance_currency = owned(balance.atol().amount().currency().item());
        let balance_units = balance.atol().amount().number().value();
        let balance_tolerance = balance
            .atol()
            .tolerance()
            .map(|x| *x.item())
            .unwrap_or(Decimal::ZERO);

        let account = self.account_mut(&account_name);
        let accumulated = account.positions.currency_units(&balance_currency);
        let margin = balance_units - accumulated;

        // pad can't last beyond balance
        let pad = account.pad.take();

        tracing::debug!("{date} balance {account_name} margin {margin} {balance_currency}");

        if margin.abs() <= balance_tolerance {
            return Ok(());
        }

        match pad {
            Some(PendingPad {
                date: pad_date,
                source,
                ..
            }) => {
                for (account, units) in [(account_name, margin), (source, -margin)] {
                    let posting = Posting {
                        account,
                        units,
                        currency: balance_currency.clone(),
                        cost: None,
                        price: None,
                    };

                    let account = self.account_mut(&posting.account);
                    account.positions.add_position(&posting);
                    account.first_used.get_or_insert(pad_date);

                    tracing::debug!("{pad_date} pad posting {}", &posting);
                    self.paddings.push(DatedPosting {
                        date: pad_date,
                        posting,
                    });
                }

                Ok(())
            }

            None => Err(directive
                .error(format!(
                    "accumulated {accumulated} {balance_currency}, error {margin} {balance_currency}"
                ))
                .into()),
        }
    }

    fn open(
        &mut self,
        open: &'a parser::Open<'a>,
        date: Date,
        directive: &'a Spanned<parser::Directive<'a>>,
    ) -> Result<(), parser::AnnotatedError> {
        let account_name = owned(open.account().item());

        let mut booking = open
            .booking()
            .map(|booking| Into::<Booking>::into(*booking.item()))
            .unwrap_or(self.default_booking);

        if !is_supported_method(booking) {
            let default_booking = Booking::default();
            self.warnings.push(
                directive
                    .warning(format!(
                        "booking method {booking} unsupported, falling back to default {default_booking}"
                    ))
                    .into(),
            );
            booking = default_booking;
        }

        let metadata = self
            .metadata_keys
            .iter()
            .filter_map(|key| metadata_value(directive, key).map(|value| (key.clone(), value)))
            .collect::<HashMap<_, _>>();

        let account = self.account_mut(&account_name);

        if let Some(opened) = account.opened {
            return Err(directive
                .error_with_contexts("account already opened", vec![("open".to_string(), opened)])
                .into());
        }

        // cannot reopen a closed account
        if let Some(closed) = account.closed {
            return Err(directive
                .error_with_contexts("account was closed", vec![("close".to_string(), closed)])
                .into());
        }

        account.opened = Some(*directive.span());
        account.open = Some(Open {
            date,
            metadata,
            booking,
        });
        account.booking = booking;

        Ok(())
    }

    fn close(
        &mut self,
        close: &'a parser::Close<'a>,
        date: Date,
        directive: &'a Spanned<parser::Directive<'a>>,
    ) -> Result<(), parser::AnnotatedError> {
        let account_name = owned(close.account().item());
        let auto_accounts = self.internal_plugins.auto_accounts;
        let account = self.account_mut(&account_name);

        if let Some(closed) = account.closed {
            // cannot reclose a closed account
            return Err(directive
                .error_with_contexts(
                    "account was already closed",
                    vec![("close".to_string(), closed)],
                )
                .into());
        }

        if account.open.is_none() && !auto_accounts {
            return Err(directive.error("account not open").into());
        }

        account.closed = Some(*directive.span());
        account.close = Some(Close { date });

        Ok(())
    }

    fn pad(
        &mut self,
        pad: &'a parser::Pad<'a>,
        date: Date,
        directive: &'a Spanned<parser::Directive<'a>>,
    ) -> Result<(), parser::AnnotatedError> {
        let account_name = owned(pad.account().item());
        let source = owned(pad.source().item());

        let account = self.account_mut(&account_name);
        let unused_pad = account.pad.replace(PendingPad {
            directive,
            date,
            source,
        });

        // unused pad directives are errors
        // https://beancount.github.io/docs/beancount_language_syntax.html#unused-pad-directives
        if let Some(unused_pad) = unused_pad {
            return Err(unused_pad.directive.error("unused").into());
        }

        Ok(())
    }
}

#[derive(Debug)]
struct AccountBuilder<'a> {
    open: Option<Open>,
    close: Option<Close>,
    opened: Option<Span>,
    closed: Option<Span>,
    booking: Booking,
    positions: Inventory,
    pad: Option<PendingPad<'a>>,
    first_used: Option<Date>,
}

impl<'a> AccountBuilder<'a> {
    fn new(booking: Booking) -> Self {
        AccountBuilder {
            open: None,
            close: None,
            opened: None,
            closed: None,
            booking,
            positions: Inventory::default(),
            pad: None,
            first_used: None,
        }
    }
}

#[derive(Debug)]
struct PendingPad<'a> {
    directive: &'a Spanned<parser::Directive<'a>>,
    date: Date,
    source: String,
}

// same-day ordering: opens first, then balance assertions, with closes last
fn rank(variant: &parser::DirectiveVariant) -> u8 {
    use parser::DirectiveVariant as Variant;

    match variant {
        Variant::Open(_) => 0,
        Variant::Balance(_) => 1,
        Variant::Close(_) => 3,
        _ => 2,
    }
}

fn metadata_value(directive: &Spanned<parser::Directive>, key: &str) -> Option<String> {
    let parsed_key = parser::Key::try_from(key).ok()?;

    directive
        .metadata()
        .key_value(parsed_key)
        .map(|value| match value.item() {
            parser::MetaValue::Simple(parser::SimpleValue::String(s)) => s.to_string(),
            value => value.to_string(),
        })
}

fn owned<S>(s: &S) -> String
where
    S: AsRef<str> + ?Sized,
{
    s.as_ref().to_string()
}
