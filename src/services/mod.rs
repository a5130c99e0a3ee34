pub mod auth_service;
pub mod rate_cache;
pub mod valuation_service;
pub mod wallet_ledger;
pub mod wallet_service;

pub use auth_service::AuthGate;
pub use rate_cache::RateCache;
pub use wallet_ledger::WalletLedger;
pub use wallet_service::{SharedWalletService, WalletService};
