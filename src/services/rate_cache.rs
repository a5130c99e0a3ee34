//! Time-bounded cache over the bulk rate table.
//!
//! At most one refresh is in flight. Callers that arrive while it runs wait
//! for it and share its outcome, success or failure, instead of fetching
//! again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::api::{RateError, RateProvider};
use crate::models::{RateTable, Rates};

/// Default TTL_SECONDS
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

struct CachedTable {
    table: Arc<RateTable>,
    fetched: Instant,
}

#[derive(Default)]
struct RefreshState {
    last_error: Option<RateError>,
}

pub struct RateCache {
    provider: Arc<dyn RateProvider>,
    ttl: Duration,
    fetch_timeout: Duration,
    cached: RwLock<Option<CachedTable>>,
    refresh: Mutex<RefreshState>,
    /// Completed refresh attempts, successful or not
    attempts: AtomicU64,
}

impl RateCache {
    pub fn new(provider: Arc<dyn RateProvider>, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            provider,
            ttl,
            fetch_timeout,
            cached: RwLock::new(None),
            refresh: Mutex::new(RefreshState::default()),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current rates: cached if younger than the TTL, otherwise refreshed.
    ///
    /// A failed refresh falls back to the last table as [`Rates::Stale`], or
    /// [`Rates::Unavailable`] when nothing was ever fetched.
    pub async fn get_rates(&self) -> Rates {
        if let Some(table) = self.fresh_table() {
            return Rates::Fresh(table);
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let mut state = self.refresh.lock().await;

        if self.attempts.load(Ordering::Acquire) != seen {
            // A refresh finished while we queued for the lock; use its outcome
            if let Some(table) = self.fresh_table() {
                return Rates::Fresh(table);
            }
            if let Some(e) = &state.last_error {
                return self.fallback(e);
            }
        }

        // Someone may have refreshed between our first look and our load of `seen`
        if let Some(table) = self.fresh_table() {
            return Rates::Fresh(table);
        }

        let outcome = match tokio::time::timeout(self.fetch_timeout, self.provider.fetch_bulk_rates()).await {
            Ok(Ok(table)) if table.is_empty() => Err(RateError::EmptyTable),
            Ok(result) => result,
            Err(_) => Err(RateError::Timeout(self.fetch_timeout)),
        };

        let rates = match outcome {
            Ok(table) => {
                info!("Rate cache refreshed with {} rates", table.len());
                let table = Arc::new(table);
                *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(CachedTable {
                    table: table.clone(),
                    fetched: Instant::now(),
                });
                state.last_error = None;
                Rates::Fresh(table)
            }
            Err(e) => {
                let rates = self.fallback(&e);
                state.last_error = Some(e);
                rates
            }
        };

        self.attempts.fetch_add(1, Ordering::Release);
        rates
    }

    /// Last fetched table regardless of age, without triggering a refresh
    pub fn peek(&self) -> Option<Arc<RateTable>> {
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|c| c.table.clone())
    }

    fn fresh_table(&self) -> Option<Arc<RateTable>> {
        let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
        cached
            .as_ref()
            .filter(|c| c.fetched.elapsed() < self.ttl)
            .map(|c| c.table.clone())
    }

    fn fallback(&self, e: &RateError) -> Rates {
        match self.peek() {
            Some(table) => {
                warn!("Rate refresh failed, serving stale table from {}: {}", table.fetched_at, e);
                Rates::Stale(table)
            }
            None => {
                error!("Rate refresh failed and no cached table exists: {}", e);
                Rates::Unavailable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{code, table, ScriptedRates};
    use rust_decimal_macros::dec;

    const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

    fn cache_over(provider: Arc<ScriptedRates>) -> Arc<RateCache> {
        Arc::new(RateCache::new(provider, DEFAULT_TTL, FETCH_TIMEOUT))
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_within_ttl_fetch_once() {
        let provider = Arc::new(ScriptedRates::serving(table(&[("USD", dec!(4.00))])));
        let cache = cache_over(provider.clone());

        let first = cache.get_rates().await;
        tokio::time::advance(Duration::from_secs(3599)).await;
        let second = cache.get_rates().await;

        assert!(matches!(first, Rates::Fresh(_)));
        assert!(matches!(second, Rates::Fresh(_)));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_table_is_refreshed() {
        let provider = Arc::new(ScriptedRates::serving(table(&[("USD", dec!(4.00))])));
        let cache = cache_over(provider.clone());

        cache.get_rates().await;
        provider.set(Some(table(&[("USD", dec!(4.10))])));
        tokio::time::advance(Duration::from_secs(3600)).await;
        let rates = cache.get_rates().await;

        assert_eq!(provider.calls(), 2);
        let table = rates.table().unwrap();
        assert_eq!(table.rate(&code("USD")), Some(dec!(4.10)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_share_one_fetch() {
        let provider = Arc::new(
            ScriptedRates::serving(table(&[("EUR", dec!(4.28))])).with_delay(Duration::from_millis(200)),
        );
        let cache = cache_over(provider.clone());

        let mut handles = Vec::new();
        for _ in 0..12 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.get_rates().await }));
        }
        for handle in handles {
            assert!(matches!(handle.await.unwrap(), Rates::Fresh(_)));
        }

        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waiters_share_a_failure() {
        let provider = Arc::new(ScriptedRates::failing().with_delay(Duration::from_millis(200)));
        let cache = cache_over(provider.clone());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.get_rates().await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_unavailable());
        }

        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_without_history_is_unavailable() {
        let provider = Arc::new(ScriptedRates::failing());
        let cache = cache_over(provider.clone());

        let rates = cache.get_rates().await;

        assert!(rates.is_unavailable());
        assert!(cache.peek().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_with_history_serves_stale() {
        let provider = Arc::new(ScriptedRates::serving(table(&[("USD", dec!(4.00))])));
        let cache = cache_over(provider.clone());
        cache.get_rates().await;

        provider.set(None);
        tokio::time::advance(Duration::from_secs(3601)).await;
        let rates = cache.get_rates().await;

        assert!(rates.is_stale());
        assert_eq!(rates.table().unwrap().rate(&code("USD")), Some(dec!(4.00)));

        // Recovery replaces the stale table
        provider.set(Some(table(&[("USD", dec!(3.95))])));
        let rates = cache.get_rates().await;
        assert!(matches!(rates, Rates::Fresh(_)));
        assert_eq!(rates.table().unwrap().rate(&code("USD")), Some(dec!(3.95)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let provider = Arc::new(
            ScriptedRates::serving(table(&[("USD", dec!(4.00))])).with_delay(Duration::from_secs(30)),
        );
        let cache = cache_over(provider.clone());

        let rates = cache.get_rates().await;

        assert!(matches!(rates, Rates::Unavailable(msg) if msg.contains("timed out")));
    }

    #[tokio::test]
    async fn test_empty_table_is_not_cached() {
        let provider = Arc::new(ScriptedRates::serving(table(&[])));
        let cache = cache_over(provider.clone());

        assert!(cache.get_rates().await.is_unavailable());
        assert!(cache.peek().is_none());
    }
}
