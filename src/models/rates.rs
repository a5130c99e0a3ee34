//! Exchange rate models

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::currency::CurrencyCode;

/// Bulk ask-rate table as published by the provider for one trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    /// PLN per one unit of the currency
    pub rates: HashMap<CurrencyCode, Decimal>,
    pub table_no: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub fetched_at: DateTime<Utc>,
}

impl RateTable {
    #[cfg(test)]
    pub fn new(rates: HashMap<CurrencyCode, Decimal>) -> Self {
        Self {
            rates,
            table_no: None,
            effective_date: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn rate(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Rates sorted by currency code, for display
    pub fn sorted(&self) -> Vec<(&CurrencyCode, Decimal)> {
        let mut rates: Vec<_> = self.rates.iter().map(|(code, rate)| (code, *rate)).collect();
        rates.sort_by(|a, b| a.0.cmp(b.0));
        rates
    }
}

/// What the rate cache hands out.
#[derive(Debug, Clone)]
pub enum Rates {
    /// Younger than the cache TTL
    Fresh(Arc<RateTable>),
    /// Refresh failed; last known table served as a fallback
    Stale(Arc<RateTable>),
    /// Refresh failed and nothing was ever cached
    Unavailable(String),
}

impl Rates {
    #[cfg(test)]
    pub fn table(&self) -> Option<&Arc<RateTable>> {
        match self {
            Rates::Fresh(table) | Rates::Stale(table) => Some(table),
            Rates::Unavailable(_) => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Rates::Stale(_))
    }

    #[cfg(test)]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Rates::Unavailable(_))
    }
}
