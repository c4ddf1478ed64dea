//! Query Client Module
//!
//! Composition root that owns the cache shared by a family of queries.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{shared, AdvancedCache, PersistenceBackend, SharedCache};
use crate::clock::{system_clock, SharedClock};
use crate::query::{CachedQuery, QueryClientConfig, QueryOptions};

// == Query Client ==
/// Hands out [`CachedQuery`] values bound to one shared cache and clock.
///
/// Every key built from the same client shares the cache's `max_size`, so a
/// burst of distinct keys can evict unrelated entries.
#[derive(Debug)]
pub struct QueryClient<V> {
    cache: SharedCache<V>,
    clock: SharedClock,
}

impl<V> Clone for QueryClient<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<V> QueryClient<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Creates a client with an in-memory cache on the system clock.
    pub fn new(config: QueryClientConfig) -> Self {
        Self::build(config, system_clock(), None)
    }

    /// Creates a client, hydrating its cache from `backend` when the config
    /// enables persistence.
    pub fn build(
        config: QueryClientConfig,
        clock: SharedClock,
        backend: Option<Arc<dyn PersistenceBackend>>,
    ) -> Self {
        let cache = AdvancedCache::build(config.cache_options(), clock.clone(), backend);
        Self {
            cache: shared(cache),
            clock,
        }
    }

    /// Wraps an existing shared cache.
    pub fn from_cache(cache: SharedCache<V>, clock: SharedClock) -> Self {
        Self { cache, clock }
    }

    pub fn cache(&self) -> SharedCache<V> {
        Arc::clone(&self.cache)
    }

    /// Builds an idle query for `key`, seeded from the cache.
    pub async fn query<F, Fut>(
        &self,
        key: impl Into<String>,
        query_fn: F,
        options: QueryOptions,
    ) -> CachedQuery<V, F>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = anyhow::Result<V>> + Send,
    {
        CachedQuery::new(
            key,
            query_fn,
            Arc::clone(&self.cache),
            options,
            Arc::clone(&self.clock),
        )
        .await
    }

    /// Builds a query and runs the on-mount fetch if data is missing or
    /// stale.
    pub async fn mount<F, Fut>(
        &self,
        key: impl Into<String>,
        query_fn: F,
        options: QueryOptions,
    ) -> CachedQuery<V, F>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = anyhow::Result<V>> + Send,
    {
        let query = self.query(key, query_fn, options).await;
        query.fetch_if_needed().await;
        query
    }
}
