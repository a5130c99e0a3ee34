//! Wallet models

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::currency::CurrencyCode;
use crate::utils::errors::WalletError;

/// One user's balances, keyed by currency. At most one entry per code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserWallet {
    pub user_id: String,
    pub balances: BTreeMap<CurrencyCode, Decimal>,
}

impl UserWallet {
    #[cfg(test)]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            balances: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn balance(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.balances.get(currency).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

/// Result of a credit or debit.
///
/// `warning` is set when the in-memory change was applied but could not be
/// written through to storage. The new total is still authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceChange {
    pub user_id: String,
    pub currency: CurrencyCode,
    pub new_total: Decimal,
    /// The entry fell to the dust threshold and was removed
    pub removed: bool,
    pub warning: Option<WalletError>,
}

impl BalanceChange {
    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }
}
