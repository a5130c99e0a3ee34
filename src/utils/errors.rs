use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::CurrencyCode;

/// Errors surfaced by wallet operations to the request layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalletError {
    /// Malformed input, rejected before any state change
    #[error("{0}")]
    Validation(String),

    #[error("No {0} balance in wallet")]
    NoSuchCurrency(CurrencyCode),

    #[error("Insufficient {currency} balance: available {available}, requested {requested}")]
    InsufficientFunds {
        currency: CurrencyCode,
        available: Decimal,
        requested: Decimal,
    },

    /// Durable storage could not be read or written
    #[error("Storage failure: {0}")]
    Persistence(String),

    /// No exchange rates could be obtained at all
    #[error("Exchange rates unavailable: {0}")]
    UpstreamUnavailable(String),
}

/// Failures from the durable ledger.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("stored amount '{amount}' for {currency} is not a decimal")]
    CorruptAmount { currency: String, amount: String },

    #[error("stored currency code '{0}' is malformed")]
    CorruptCode(String),
}

impl From<StorageError> for WalletError {
    fn from(e: StorageError) -> Self {
        WalletError::Persistence(e.to_string())
    }
}
