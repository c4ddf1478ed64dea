//! Cache construction options.

use serde::{Deserialize, Serialize};

/// Default entry ceiling.
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default entry lifetime: 5 minutes.
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;

/// Default snapshot namespace for a standalone cache.
pub const DEFAULT_PERSISTENCE_KEY: &str = "app-cache";

// == Cache Options ==
/// Configuration fixed at cache construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Entry ceiling enforced by LRU eviction
    pub max_size: usize,
    /// TTL in milliseconds for `set` calls without an explicit TTL
    pub default_ttl: u64,
    /// Track access order and evict past `max_size`
    pub enable_lru: bool,
    /// Mirror contents to the persistence backend
    pub enable_persistence: bool,
    /// Namespace of the persisted snapshot
    pub persistence_key: String,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl: DEFAULT_TTL_MS,
            enable_lru: true,
            enable_persistence: false,
            persistence_key: DEFAULT_PERSISTENCE_KEY.to_string(),
        }
    }
}

impl CacheOptions {
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_default_ttl(mut self, ttl_ms: u64) -> Self {
        self.default_ttl = ttl_ms;
        self
    }

    pub fn with_lru(mut self, enabled: bool) -> Self {
        self.enable_lru = enabled;
        self
    }

    /// Enables persistence under the given snapshot namespace.
    pub fn with_persistence(mut self, persistence_key: impl Into<String>) -> Self {
        self.enable_persistence = true;
        self.persistence_key = persistence_key.into();
        self
    }
}
