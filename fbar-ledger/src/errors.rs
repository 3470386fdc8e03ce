use std::{
    error::Error,
    fmt::{Debug, Display},
};

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum BookingError {
    Transaction(TransactionBookingError),
    Posting(usize, PostingBookingError),
}

impl Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use BookingError::*;

        match self {
            Transaction(e) => write!(f, "{e}"),
            Posting(idx, e) => write!(f, "{e} on posting {idx}"),
        }
    }
}

impl Error for BookingError {}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum TransactionBookingError {
    AmbiguousAutoPost,
}

impl Display for TransactionBookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TransactionBookingError::*;

        match self {
            AmbiguousAutoPost => f.write_str("more than one posting without an amount"),
        }
    }
}

impl Error for TransactionBookingError {}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum PostingBookingError {
    AmbiguousMatches,
    CannotInferCurrency,
    CannotInferCost,
    CannotInferPrice,
    CannotInferPriceCurrency,
    NotEnoughLotsToReduce,
    NoPositionMatches,
}

impl Display for PostingBookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use PostingBookingError::*;

        match self {
            AmbiguousMatches => f.write_str("ambiguous matches"),
            CannotInferCurrency => f.write_str("cannot infer currency"),
            CannotInferCost => f.write_str("cannot infer cost"),
            CannotInferPrice => f.write_str("cannot infer price"),
            CannotInferPriceCurrency => f.write_str("cannot infer price currency"),
            NotEnoughLotsToReduce => f.write_str("not enough lots to reduce"),
            NoPositionMatches => f.write_str("no position matches"),
        }
    }
}

impl Error for PostingBookingError {}
