//! Operations exposed to the request layer.
//!
//! Callers pass resolved user ids; storage and network details never leak
//! past this point.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::rate_cache::RateCache;
use super::valuation_service;
use super::wallet_ledger::WalletLedger;
use crate::models::{BalanceChange, Rates, UserWallet, Valuation};
use crate::utils::errors::WalletError;

pub struct WalletService {
    ledger: WalletLedger,
    rates: RateCache,
}

impl WalletService {
    pub fn new(ledger: WalletLedger, rates: RateCache) -> Self {
        Self { ledger, rates }
    }

    pub async fn credit(&self, user_id: &str, currency: &str, amount: Decimal) -> Result<BalanceChange, WalletError> {
        self.ledger.credit(user_id, currency, amount).await
    }

    pub async fn debit(&self, user_id: &str, currency: &str, amount: Decimal) -> Result<BalanceChange, WalletError> {
        self.ledger.debit(user_id, currency, amount).await
    }

    pub async fn balances(&self, user_id: &str) -> Result<UserWallet, WalletError> {
        self.ledger.snapshot(user_id).await
    }

    /// Value the user's wallet in the home currency
    pub async fn valuate_wallet(&self, user_id: &str) -> Result<Valuation, WalletError> {
        let wallet = self.ledger.snapshot(user_id).await?;
        let rates = self.rates.get_rates().await;
        valuation_service::valuate(&wallet, &rates)
    }

    pub async fn rates(&self) -> Rates {
        self.rates.get_rates().await
    }

    pub fn rate_cache(&self) -> &RateCache {
        &self.rates
    }

    pub fn ledger(&self) -> &WalletLedger {
        &self.ledger
    }
}

/// Shared handle stored in the client data map
pub type SharedWalletService = Arc<WalletService>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, SqliteLedger};
    use crate::services::rate_cache::DEFAULT_TTL;
    use crate::testing::{code, table, MemoryLedger, ScriptedRates};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn service(store: Arc<MemoryLedger>, provider: Arc<ScriptedRates>) -> WalletService {
        WalletService::new(
            WalletLedger::new(store, TIMEOUT),
            RateCache::new(provider, DEFAULT_TTL, TIMEOUT),
        )
    }

    #[tokio::test]
    async fn test_valuate_wallet_uses_balances_and_rates() {
        let provider = Arc::new(ScriptedRates::serving(table(&[("USD", dec!(4.00)), ("EUR", dec!(4.25))])));
        let service = service(Arc::new(MemoryLedger::default()), provider.clone());

        service.credit("user1", "usd", dec!(100)).await.unwrap();
        service.credit("user1", "EUR", dec!(10)).await.unwrap();
        service.credit("user1", "XYZ", dec!(5)).await.unwrap();

        let report = service.valuate_wallet("user1").await.unwrap().report();
        assert_eq!(report.lines.len(), 2);
        assert_eq!(report.total, dec!(442.50));
        assert_eq!(report.skipped, vec!["XYZ".to_string()]);

        service.valuate_wallet("user1").await.unwrap();
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_valuate_wallet_without_rates_is_upstream_unavailable() {
        let service = service(Arc::new(MemoryLedger::default()), Arc::new(ScriptedRates::failing()));
        service.credit("user1", "USD", dec!(100)).await.unwrap();

        let err = service.valuate_wallet("user1").await.unwrap_err();

        assert!(matches!(err, WalletError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_balances_survive_restart_through_sqlite() {
        let pool = init_db("sqlite::memory:").await.unwrap();
        let provider = Arc::new(ScriptedRates::serving(table(&[("USD", dec!(4.00))])));

        let first = WalletService::new(
            WalletLedger::new(Arc::new(SqliteLedger::new(pool.clone())), TIMEOUT),
            RateCache::new(provider.clone(), DEFAULT_TTL, TIMEOUT),
        );
        first.credit("user1", "USD", dec!(100)).await.unwrap();
        first.credit("user1", "GBP", dec!(3)).await.unwrap();
        first.debit("user1", "GBP", dec!(3)).await.unwrap();
        first.debit("user1", "USD", dec!(25.5)).await.unwrap();

        // A fresh ledger over the same database hydrates what was written through
        let second = WalletService::new(
            WalletLedger::new(Arc::new(SqliteLedger::new(pool)), TIMEOUT),
            RateCache::new(provider, DEFAULT_TTL, TIMEOUT),
        );
        let wallet = second.balances("user1").await.unwrap();

        assert_eq!(wallet.balances.len(), 1);
        assert_eq!(wallet.balance(&code("USD")), Some(dec!(74.5)));
    }
}
