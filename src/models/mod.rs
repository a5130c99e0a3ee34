//! Data models for the wallet
//!
//! Plain data shared between the ledger, the rate cache, valuation and the
//! command layer.

pub mod currency;
pub mod rates;
pub mod valuation;
pub mod wallet;

// Re-export commonly used types for convenience
pub use currency::{CurrencyCode, HOME_CURRENCY};
pub use rates::{RateTable, Rates};
pub use valuation::{Valuation, ValuationLine};
pub use wallet::{BalanceChange, UserWallet};
