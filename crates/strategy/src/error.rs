use rust_decimal::Decimal;
use thiserror::Error;

/// Recoverable reasons for not entering on a tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// One of the legs quoted at or below zero; retried on the next tick.
    #[error("invalid quote at strike {strike}: call {call}, put {put}")]
    InvalidQuote {
        strike: i64,
        call: Decimal,
        put: Decimal,
    },
}
