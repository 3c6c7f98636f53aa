//! Query cache
//!
//! Type-erased concurrent cache of read results. Concurrent loads of one
//! key are coalesced into a single request; entries leave the cache when
//! they go stale or are invalidated after a mutation.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use moka::future::Cache;
use tracing::{debug, warn};
use crate::config::CacheConfig;
use crate::utils::errors::{ConsoleError, Result};
use super::keys::{QueryKey, Resource};

type CachedValue = Arc<dyn Any + Send + Sync>;

/// Retry policy of a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            retries: config.query_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (0-based): `min(base * 2^attempt, max)`
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Whether a failure after `attempt` retries should be retried
    pub fn should_retry(&self, attempt: u32, error: &ConsoleError) -> bool {
        attempt < self.retries && !error.is_auth_error() && error.is_recoverable()
    }

    /// Run `operation`, retrying recoverable failures
    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if self.should_retry(attempt, &e) => {
                    let delay = self.delay(attempt);
                    warn!(attempt = attempt + 1, delay_ms = delay.as_millis() as u64, error = %e, "Retrying query");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Concurrent read cache keyed by [`QueryKey`]
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<QueryKey, CachedValue>,
}

impl QueryCache {
    /// Create a cache; `stale_seconds == 0` keeps entries until invalidated
    pub fn new(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(config.max_capacity)
            .support_invalidation_closures();
        if config.stale_seconds > 0 {
            builder = builder.time_to_live(Duration::from_secs(config.stale_seconds));
        }

        Self { inner: builder.build() }
    }

    /// Return the cached value or load it once for all concurrent callers
    pub async fn fetch<T, Fut>(&self, key: QueryKey, loader: Fut) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T>>,
    {
        let label = key.to_string();
        let value = self
            .inner
            .try_get_with(key, async {
                debug!(key = %label, "Loading query");
                loader.await.map(|value| Arc::new(value) as CachedValue)
            })
            .await
            .map_err(ConsoleError::from_shared)?;

        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ConsoleError::Config(format!("Cached value for {} has another type", label)))
    }

    /// Peek at a cached value without loading
    pub async fn get<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.inner
            .get(key)
            .await
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.inner.get(key).await.is_some()
    }

    /// Drop one key
    pub async fn invalidate(&self, key: &QueryKey) {
        debug!(key = %key, "Invalidating query");
        self.inner.invalidate(key).await;
    }

    /// Drop every key of a resource family
    pub fn invalidate_resource(&self, resource: Resource) {
        debug!(resource = resource.as_str(), "Invalidating queries");
        if let Err(e) = self.inner.invalidate_entries_if(move |key, _| key.resource == resource) {
            warn!(error = %e, "Predicate invalidation unavailable, clearing cache");
            self.inner.invalidate_all();
        }
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}
