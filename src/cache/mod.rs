//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, LRU eviction and
//! snapshot persistence.

mod entry;
mod lru;
mod options;
pub mod persistence;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::AccessOrder;
pub use options::{CacheOptions, DEFAULT_MAX_SIZE, DEFAULT_PERSISTENCE_KEY, DEFAULT_TTL_MS};
pub use persistence::{FileBackend, MemoryBackend, PersistenceBackend};
pub use stats::CacheStats;
pub use store::AdvancedCache;

/// A cache shared between tasks.
pub type SharedCache<V> = Arc<RwLock<AdvancedCache<V>>>;

/// Wraps a cache for sharing.
pub fn shared<V>(cache: AdvancedCache<V>) -> SharedCache<V> {
    Arc::new(RwLock::new(cache))
}
