//! In-memory wallets with write-through to durable storage.
//!
//! Every user gets their own async mutex. Hydration, credits and debits for
//! one user are serialized on it; different users never contend beyond the
//! brief registry lookup.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::db::PersistentLedger;
use crate::models::{BalanceChange, CurrencyCode, UserWallet};
use crate::utils::errors::{StorageError, WalletError};

/// A debit leaving this much or less removes the entry
pub const DUST_THRESHOLD: Decimal = dec!(0.01);

#[derive(Default)]
struct WalletSlot {
    /// Set once the first load from storage has succeeded
    resident: bool,
    balances: BTreeMap<CurrencyCode, Decimal>,
}

/// Read access to a resident wallet.
///
/// Holds the user's lock: credits and debits for this user wait until it is
/// dropped.
pub struct WalletGuard {
    user_id: String,
    slot: OwnedMutexGuard<WalletSlot>,
}

impl WalletGuard {
    #[cfg(test)]
    pub fn balance(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.slot.balances.get(currency).copied()
    }

    pub fn to_wallet(&self) -> UserWallet {
        UserWallet {
            user_id: self.user_id.clone(),
            balances: self.slot.balances.clone(),
        }
    }
}

pub struct WalletLedger {
    store: Arc<dyn PersistentLedger>,
    wallets: RwLock<HashMap<String, Arc<Mutex<WalletSlot>>>>,
    /// Slots whose first load succeeded
    resident: AtomicUsize,
    storage_timeout: Duration,
}

impl WalletLedger {
    pub fn new(store: Arc<dyn PersistentLedger>, storage_timeout: Duration) -> Self {
        Self {
            store,
            wallets: RwLock::new(HashMap::new()),
            resident: AtomicUsize::new(0),
            storage_timeout,
        }
    }

    /// The resident wallet for `user_id`, loading it from storage on first touch.
    ///
    /// Concurrent callers for the same user queue behind one load. If the
    /// load fails the user stays unloaded and the next call tries again.
    pub async fn get_or_load(&self, user_id: &str) -> Result<WalletGuard, WalletError> {
        let slot = self.lock_resident(user_id).await?;
        Ok(WalletGuard {
            user_id: user_id.to_string(),
            slot,
        })
    }

    /// Point-in-time copy of a user's balances
    pub async fn snapshot(&self, user_id: &str) -> Result<UserWallet, WalletError> {
        Ok(self.get_or_load(user_id).await?.to_wallet())
    }

    /// Add `amount` of `currency`, creating the entry if needed.
    ///
    /// A failed write-through still returns `Ok`, with the storage error in
    /// [`BalanceChange::warning`]. A sum that does not fit in a `Decimal` is
    /// rejected and the wallet is left as it was.
    pub async fn credit(&self, user_id: &str, currency: &str, amount: Decimal) -> Result<BalanceChange, WalletError> {
        let currency = CurrencyCode::parse(currency)?;
        validate_amount(amount)?;

        let mut slot = self.lock_resident(user_id).await?;
        let current = slot.balances.get(&currency).copied().unwrap_or(Decimal::ZERO);
        let new_total = current.checked_add(amount).ok_or_else(|| {
            WalletError::Validation(format!(
                "Adding {} {} would exceed the largest balance a wallet can hold",
                amount, currency
            ))
        })?;
        slot.balances.insert(currency.clone(), new_total);

        let warning = self
            .write_through(user_id, &currency, self.store.upsert(user_id, &currency, new_total))
            .await;
        drop(slot);

        debug!("Credited {} {} to {} (total {})", amount, currency, user_id, new_total);
        Ok(BalanceChange {
            user_id: user_id.to_string(),
            currency,
            new_total,
            removed: false,
            warning,
        })
    }

    /// Subtract `amount` of `currency`.
    ///
    /// Fails without touching the wallet if the currency is absent or the
    /// balance is short. A remainder at or below [`DUST_THRESHOLD`] removes
    /// the entry and reports a total of zero.
    pub async fn debit(&self, user_id: &str, currency: &str, amount: Decimal) -> Result<BalanceChange, WalletError> {
        let currency = CurrencyCode::parse(currency)?;
        validate_amount(amount)?;

        let mut slot = self.lock_resident(user_id).await?;
        let available = slot
            .balances
            .get(&currency)
            .copied()
            .ok_or_else(|| WalletError::NoSuchCurrency(currency.clone()))?;

        if available < amount {
            return Err(WalletError::InsufficientFunds {
                currency,
                available,
                requested: amount,
            });
        }

        let remaining = available - amount;
        let (new_total, removed, warning) = if remaining <= DUST_THRESHOLD {
            slot.balances.remove(&currency);
            let warning = self
                .write_through(user_id, &currency, self.store.delete(user_id, &currency))
                .await;
            (Decimal::ZERO, true, warning)
        } else {
            slot.balances.insert(currency.clone(), remaining);
            let warning = self
                .write_through(user_id, &currency, self.store.upsert(user_id, &currency, remaining))
                .await;
            (remaining, false, warning)
        };
        drop(slot);

        debug!("Debited {} {} from {} (total {})", amount, currency, user_id, new_total);
        Ok(BalanceChange {
            user_id: user_id.to_string(),
            currency,
            new_total,
            removed,
            warning,
        })
    }

    /// Number of users whose wallet has been loaded into memory
    pub fn resident_count(&self) -> usize {
        self.resident.load(Ordering::Relaxed)
    }

    fn slot_for(&self, user_id: &str) -> Arc<Mutex<WalletSlot>> {
        if let Some(slot) = self
            .wallets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
        {
            return slot.clone();
        }

        self.wallets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    /// Lock the user's slot, hydrating it from storage if this is the first touch
    async fn lock_resident(&self, user_id: &str) -> Result<OwnedMutexGuard<WalletSlot>, WalletError> {
        let mut slot = self.slot_for(user_id).lock_owned().await;
        if slot.resident {
            return Ok(slot);
        }

        let loaded = self.bounded(self.store.load_all(user_id)).await.map_err(|e| {
            warn!("Failed to load wallet for {}: {}", user_id, e);
            WalletError::from(e)
        })?;

        debug!("Loaded wallet for {} with {} balance(s)", user_id, loaded.len());
        slot.balances = loaded;
        slot.resident = true;
        self.resident.fetch_add(1, Ordering::Relaxed);
        Ok(slot)
    }

    async fn write_through(
        &self,
        user_id: &str,
        currency: &CurrencyCode,
        write: impl Future<Output = Result<(), StorageError>>,
    ) -> Option<WalletError> {
        match self.bounded(write).await {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    "Write-through failed for {} {}, keeping in-memory balance: {}",
                    user_id, currency, e
                );
                Some(WalletError::from(e))
            }
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T, StorageError>>) -> Result<T, StorageError> {
        tokio::time::timeout(self.storage_timeout, call)
            .await
            .map_err(|_| StorageError::Timeout(self.storage_timeout))?
    }
}

fn validate_amount(amount: Decimal) -> Result<(), WalletError> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::Validation(format!(
            "Amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}
