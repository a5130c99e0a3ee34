use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePool;

use super::wallet;
use crate::models::CurrencyCode;
use crate::utils::errors::StorageError;

/// Durable (user, currency) -> amount store behind the wallet ledger.
///
/// `upsert` must be idempotent (last write wins) and both `upsert` and
/// `delete` must accept a currency that was never stored.
#[async_trait]
pub trait PersistentLedger: Send + Sync {
    async fn load_all(&self, user_id: &str) -> Result<BTreeMap<CurrencyCode, Decimal>, StorageError>;

    async fn upsert(&self, user_id: &str, currency: &CurrencyCode, amount: Decimal) -> Result<(), StorageError>;

    async fn delete(&self, user_id: &str, currency: &CurrencyCode) -> Result<(), StorageError>;
}

/// [`PersistentLedger`] on the `wallet` SQLite table
#[derive(Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistentLedger for SqliteLedger {
    async fn load_all(&self, user_id: &str) -> Result<BTreeMap<CurrencyCode, Decimal>, StorageError> {
        let rows = wallet::load_wallet(&self.pool, user_id).await?;

        let mut balances = BTreeMap::new();
        for (code, amount) in rows {
            let currency = CurrencyCode::parse(&code).map_err(|_| StorageError::CorruptCode(code.clone()))?;
            let amount = Decimal::from_str(&amount).map_err(|_| StorageError::CorruptAmount {
                currency: code,
                amount,
            })?;
            balances.insert(currency, amount);
        }

        Ok(balances)
    }

    async fn upsert(&self, user_id: &str, currency: &CurrencyCode, amount: Decimal) -> Result<(), StorageError> {
        wallet::save_currency(&self.pool, user_id, currency.as_str(), &amount.to_string()).await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str, currency: &CurrencyCode) -> Result<(), StorageError> {
        wallet::delete_currency(&self.pool, user_id, currency.as_str()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use rust_decimal_macros::dec;

    async fn memory_ledger() -> SqliteLedger {
        let pool = init_db("sqlite::memory:").await.unwrap();
        SqliteLedger::new(pool)
    }

    fn code(raw: &str) -> CurrencyCode {
        CurrencyCode::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_is_last_write_wins() {
        let ledger = memory_ledger().await;

        ledger.upsert("user1", &code("USD"), dec!(100)).await.unwrap();
        ledger.upsert("user1", &code("USD"), dec!(150.25)).await.unwrap();
        ledger.upsert("user1", &code("USD"), dec!(150.25)).await.unwrap();

        let balances = ledger.load_all("user1").await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[&code("USD")], dec!(150.25));
    }

    #[tokio::test]
    async fn test_load_is_scoped_to_user() {
        let ledger = memory_ledger().await;

        ledger.upsert("user1", &code("USD"), dec!(1)).await.unwrap();
        ledger.upsert("user2", &code("EUR"), dec!(2)).await.unwrap();

        let balances = ledger.load_all("user2").await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[&code("EUR")], dec!(2));
        assert!(ledger.load_all("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_row_succeeds() {
        let ledger = memory_ledger().await;

        ledger.delete("user1", &code("CHF")).await.unwrap();

        ledger.upsert("user1", &code("CHF"), dec!(3)).await.unwrap();
        ledger.delete("user1", &code("CHF")).await.unwrap();
        assert!(ledger.load_all("user1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_amounts_round_trip_exactly() {
        let ledger = memory_ledger().await;

        ledger.upsert("user1", &code("GBP"), dec!(0.1) + dec!(0.2)).await.unwrap();

        let balances = ledger.load_all("user1").await.unwrap();
        assert_eq!(balances[&code("GBP")], dec!(0.3));
    }

    #[tokio::test]
    async fn test_corrupt_amount_is_reported() {
        let ledger = memory_ledger().await;
        wallet::save_currency(&ledger.pool, "user1", "USD", "lots").await.unwrap();

        let err = ledger.load_all("user1").await.unwrap_err();
        assert!(matches!(err, StorageError::CorruptAmount { .. }));
    }
}
