//! Query and query-client options.

use serde::{Deserialize, Serialize};

use crate::cache::{CacheOptions, DEFAULT_MAX_SIZE, DEFAULT_TTL_MS};

/// Default lifetime of the query client's backing cache entries: 10 minutes.
pub const DEFAULT_CACHE_TIME_MS: u64 = 10 * 60 * 1000;

/// Default snapshot namespace for the query client's backing cache.
pub const DEFAULT_QUERY_PERSISTENCE_KEY: &str = "query-cache";

// == Query Options ==
/// Per-query behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Lifetime in milliseconds of the cache entry written after a fetch
    pub ttl: u64,
    /// When false no fetch ever runs; seeded data is returned as-is
    pub enabled: bool,
    /// Age in milliseconds after which data counts as stale
    pub stale_time: u64,
    /// Refetch stale data when the host regains focus
    pub refetch_on_window_focus: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL_MS,
            enabled: true,
            stale_time: 0,
            refetch_on_window_focus: false,
        }
    }
}

impl QueryOptions {
    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl = ttl_ms;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_stale_time(mut self, stale_time_ms: u64) -> Self {
        self.stale_time = stale_time_ms;
        self
    }

    pub fn with_refetch_on_window_focus(mut self, refetch: bool) -> Self {
        self.refetch_on_window_focus = refetch;
        self
    }
}

// == Query Client Config ==
/// Settings for the cache a [`QueryClient`](super::QueryClient) owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryClientConfig {
    /// Entry ceiling shared by every query key
    pub max_size: usize,
    /// Default TTL of the backing cache in milliseconds
    pub cache_time: u64,
    pub enable_lru: bool,
    pub enable_persistence: bool,
    pub persistence_key: String,
}

impl Default for QueryClientConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            cache_time: DEFAULT_CACHE_TIME_MS,
            enable_lru: true,
            enable_persistence: false,
            persistence_key: DEFAULT_QUERY_PERSISTENCE_KEY.to_string(),
        }
    }
}

impl QueryClientConfig {
    /// Maps to the options of the backing cache.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            max_size: self.max_size,
            default_ttl: self.cache_time,
            enable_lru: self.enable_lru,
            enable_persistence: self.enable_persistence,
            persistence_key: self.persistence_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_options_default() {
        let options = QueryOptions::default();
        assert_eq!(options.ttl, 300_000);
        assert!(options.enabled);
        assert_eq!(options.stale_time, 0);
        assert!(!options.refetch_on_window_focus);
    }

    #[test]
    fn test_client_config_maps_cache_time() {
        let config = QueryClientConfig::default();
        let options = config.cache_options();

        assert_eq!(options.default_ttl, 600_000);
        assert_eq!(options.max_size, 100);
        assert_eq!(options.persistence_key, "query-cache");
        assert!(!options.enable_persistence);
    }
}
