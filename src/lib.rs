//! Advanced Cache - generic in-process cache with cached queries
//!
//! Provides TTL expiration, LRU eviction, snapshot persistence and an async
//! fetch-and-cache query layer, plus an HTTP host for a JSON-valued cache.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod tasks;

pub use api::AppState;
pub use cache::{AdvancedCache, CacheOptions, CacheStats, SharedCache};
pub use config::Config;
pub use query::{CachedQuery, QueryClient, QueryClientConfig, QueryOptions, QueryState};
pub use tasks::spawn_cleanup_task;
