//! Valuation models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::currency::{CurrencyCode, HOME_CURRENCY};
use crate::utils::money::round2;

/// A single valued balance. All figures are unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationLine {
    pub currency: CurrencyCode,
    pub amount: Decimal,
    pub rate: Decimal,
    pub value: Decimal,
}

/// A wallet valued in the home currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub user_id: String,
    pub lines: Vec<ValuationLine>,
    /// Sum of unrounded line values
    pub total: Decimal,
    /// Balances with no rate in the table
    pub skipped: Vec<CurrencyCode>,
    pub stale: bool,
    pub effective_date: Option<NaiveDate>,
    pub rates_fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReportLine {
    pub currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
}

/// Display form of a [`Valuation`], every number rounded to 2 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub user_id: String,
    pub home_currency: &'static str,
    pub lines: Vec<ValuationReportLine>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub skipped: Vec<String>,
    pub stale: bool,
    pub effective_date: Option<NaiveDate>,
    pub rates_fetched_at: DateTime<Utc>,
}

impl Valuation {
    pub fn report(&self) -> ValuationReport {
        ValuationReport {
            user_id: self.user_id.clone(),
            home_currency: HOME_CURRENCY,
            lines: self
                .lines
                .iter()
                .map(|line| ValuationReportLine {
                    currency: line.currency.to_string(),
                    amount: round2(line.amount),
                    rate: round2(line.rate),
                    value: round2(line.value),
                })
                .collect(),
            total: round2(self.total),
            skipped: self.skipped.iter().map(|c| c.to_string()).collect(),
            stale: self.stale,
            effective_date: self.effective_date,
            rates_fetched_at: self.rates_fetched_at,
        }
    }
}
