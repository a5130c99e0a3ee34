use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// One table from `GET /exchangerates/tables/c/`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableC {
    pub no: String,
    pub effective_date: NaiveDate,
    pub rates: Vec<TableCRate>,
}

/// Sell quote for one currency, PLN per unit. The bid side is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TableCRate {
    pub currency: String,
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub ask: Decimal,
}

/// Error response body, when the API sends JSON at all
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
}

/// Failures fetching the bulk rate table.
///
/// `Clone` so one failed refresh can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateError {
    /// 404: no table published for the requested day
    #[error("No rate table published: {0}")]
    NotFound(String),

    #[error("Rate provider server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Rate provider HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("Rate request failed: {0}")]
    RequestError(String),

    #[error("Could not parse rate table: {0}")]
    DeserializationError(String),

    #[error("Rate table contained no rates")]
    EmptyTable,

    #[error("Rate fetch timed out after {0:?}")]
    Timeout(Duration),
}
