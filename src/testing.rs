//! In-memory collaborators for unit tests

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::api::{RateError, RateProvider};
use crate::db::PersistentLedger;
use crate::models::{CurrencyCode, RateTable};
use crate::utils::errors::StorageError;

pub fn code(raw: &str) -> CurrencyCode {
    CurrencyCode::parse(raw).unwrap()
}

pub fn table(rates: &[(&str, Decimal)]) -> RateTable {
    RateTable::new(rates.iter().map(|(c, r)| (code(c), *r)).collect())
}

/// Ledger backed by a map, with call counters and switchable failures
#[derive(Default)]
pub struct MemoryLedger {
    rows: Mutex<HashMap<(String, CurrencyCode), Decimal>>,
    pub loads: AtomicUsize,
    pub upserts: AtomicUsize,
    pub deletes: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub fail_loads: AtomicBool,
    load_delay: Option<Duration>,
}

impl MemoryLedger {
    pub fn with_load_delay(delay: Duration) -> Self {
        Self {
            load_delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn seed(&self, user_id: &str, currency: &str, amount: Decimal) {
        self.rows
            .lock()
            .unwrap()
            .insert((user_id.to_string(), code(currency)), amount);
    }

    pub fn stored(&self, user_id: &str, currency: &str) -> Option<Decimal> {
        self.rows
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), code(currency)))
            .copied()
    }
}

#[async_trait]
impl PersistentLedger for MemoryLedger {
    async fn load_all(&self, user_id: &str) -> Result<BTreeMap<CurrencyCode, Decimal>, StorageError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
        }

        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|((_, currency), amount)| (currency.clone(), *amount))
            .collect())
    }

    async fn upsert(&self, user_id: &str, currency: &CurrencyCode, amount: Decimal) -> Result<(), StorageError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
        }
        self.rows
            .lock()
            .unwrap()
            .insert((user_id.to_string(), currency.clone()), amount);
        Ok(())
    }

    async fn delete(&self, user_id: &str, currency: &CurrencyCode) -> Result<(), StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
        }
        self.rows
            .lock()
            .unwrap()
            .remove(&(user_id.to_string(), currency.clone()));
        Ok(())
    }
}

/// Rate provider that returns a fixed table (or fails), counting calls
pub struct ScriptedRates {
    table: Mutex<Option<RateTable>>,
    pub calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedRates {
    pub fn serving(table: RateTable) -> Self {
        Self {
            table: Mutex::new(Some(table)),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            table: Mutex::new(None),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Swap what later fetches return; `None` makes them fail
    pub fn set(&self, table: Option<RateTable>) {
        *self.table.lock().unwrap() = table;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateProvider for ScriptedRates {
    async fn fetch_bulk_rates(&self) -> Result<RateTable, RateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.table
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RateError::ServerError(503, "Service Unavailable".to_string()))
    }
}
