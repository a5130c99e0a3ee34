//! External rate sources

use async_trait::async_trait;

use crate::models::RateTable;

pub mod nbp;

pub use nbp::{NbpClient, RateError};

/// Source of the bulk ask-rate table for the current trading day.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_bulk_rates(&self) -> Result<RateTable, RateError>;
}
