//! Cached Query Module
//!
//! Wraps an async fetch function with cache-backed memoization, staleness
//! tracking and a single-flight guard.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::SharedCache;
use crate::clock::SharedClock;
use crate::query::{QueryOptions, QueryState};

// == Cached Query ==
/// A query bound to one key of a shared cache.
///
/// At most one fetch runs at a time. A trigger that arrives while a fetch is
/// in flight is dropped; callers observe the in-flight result through
/// [`state`](Self::state) or [`subscribe`](Self::subscribe).
pub struct CachedQuery<V, F> {
    key: String,
    query_fn: F,
    cache: SharedCache<V>,
    options: QueryOptions,
    clock: SharedClock,
    in_flight: AtomicBool,
    state: watch::Sender<QueryState<V>>,
}

impl<V, F, Fut> CachedQuery<V, F>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<V>> + Send,
{
    // == Constructor ==
    /// Creates an idle query seeded from any live cache entry under `key`.
    pub async fn new(
        key: impl Into<String>,
        query_fn: F,
        cache: SharedCache<V>,
        options: QueryOptions,
        clock: SharedClock,
    ) -> Self {
        let key = key.into();
        let seeded = cache.write().await.get(&key);
        if seeded.is_some() {
            debug!("Query '{}' seeded from cache", key);
        }

        let (state, _) = watch::channel(QueryState::seeded(seeded));
        Self {
            key,
            query_fn,
            cache,
            options,
            clock,
            in_flight: AtomicBool::new(false),
            state,
        }
    }

    // == Triggers ==
    /// Fetches when data is missing or stale. Returns whether a fetch ran.
    pub async fn fetch_if_needed(&self) -> bool {
        self.fetch(false).await
    }

    /// Fetches regardless of staleness, unless a fetch is already in flight.
    /// Returns whether a fetch ran.
    pub async fn refetch(&self) -> bool {
        self.fetch(true).await
    }

    /// Reacts to the host becoming visible or focused.
    pub async fn handle_focus(&self) -> bool {
        if !self.options.refetch_on_window_focus || !self.is_stale() {
            return false;
        }
        self.fetch(false).await
    }

    // == Invalidate ==
    /// Drops the cached entry and marks the data stale. Does not fetch.
    pub async fn invalidate(&self) {
        self.cache.write().await.remove(&self.key);
        self.state.send_modify(|state| state.last_fetch_at = 0);
        debug!("Query '{}' invalidated", self.key);
    }

    // == Accessors ==
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> QueryState<V> {
        self.state.borrow().clone()
    }

    /// Returns a receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<V>> {
        self.state.subscribe()
    }

    pub fn data(&self) -> Option<V> {
        self.state.borrow().data.clone()
    }

    pub fn error(&self) -> Option<Arc<anyhow::Error>> {
        self.state.borrow().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn is_stale(&self) -> bool {
        self.state
            .borrow()
            .is_stale(self.clock.now_ms(), self.options.stale_time)
    }

    // == Fetch ==
    async fn fetch(&self, force: bool) -> bool {
        if !self.options.enabled {
            return false;
        }
        if !force && !self.needs_fetch() {
            return false;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Query '{}' already in flight, trigger dropped", self.key);
            return false;
        }

        let _guard = InFlightGuard {
            in_flight: &self.in_flight,
            state: &self.state,
        };
        self.state.send_modify(|state| state.is_loading = true);

        match (self.query_fn)().await {
            Ok(data) => {
                self.cache
                    .write()
                    .await
                    .set(self.key.clone(), data.clone(), Some(self.options.ttl));
                let now = self.clock.now_ms();
                self.state.send_modify(|state| {
                    state.data = Some(data);
                    state.error = None;
                    state.is_loading = false;
                    state.last_fetch_at = now;
                });
            }
            Err(e) => {
                warn!("Query '{}' fetch failed: {:#}", self.key, e);
                let cached = self.cache.write().await.get(&self.key);
                self.state.send_modify(|state| {
                    if cached.is_some() {
                        state.data = cached;
                    }
                    state.error = Some(Arc::new(e));
                    state.is_loading = false;
                });
            }
        }

        true
    }

    fn needs_fetch(&self) -> bool {
        let state = self.state.borrow();
        state.data.is_none() || state.is_stale(self.clock.now_ms(), self.options.stale_time)
    }
}

impl<V, F, Fut> CachedQuery<V, F>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
{
    // == Focus Listener ==
    /// Spawns a task that calls [`handle_focus`](Self::handle_focus) each
    /// time `focus` turns true. The task ends when the sender is dropped.
    pub fn watch_focus(self: Arc<Self>, mut focus: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while focus.changed().await.is_ok() {
                let visible = *focus.borrow_and_update();
                if visible && self.handle_focus().await {
                    debug!("Query '{}' refetched on focus", self.key);
                }
            }
        })
    }
}

// == In-Flight Guard ==
/// Releases the single-flight flag even if the fetch future is dropped.
struct InFlightGuard<'a, V> {
    in_flight: &'a AtomicBool,
    state: &'a watch::Sender<QueryState<V>>,
}

impl<V> Drop for InFlightGuard<'_, V> {
    fn drop(&mut self) {
        self.state
            .send_if_modified(|state| std::mem::replace(&mut state.is_loading, false));
        self.in_flight.store(false, Ordering::Release);
    }
}
