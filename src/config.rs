//! Configuration Module
//!
//! Loads host configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{CacheOptions, DEFAULT_MAX_SIZE, DEFAULT_PERSISTENCE_KEY, DEFAULT_TTL_MS};

/// Host configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_size: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// Evict least recently used entries past `max_size`
    pub enable_lru: bool,
    /// Write a snapshot after every mutation
    pub enable_persistence: bool,
    /// Snapshot namespace
    pub persistence_key: String,
    /// Directory holding snapshot files
    pub persistence_dir: PathBuf,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in milliseconds
    pub cleanup_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_SIZE` - Maximum cache entries (default: 100)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `ENABLE_LRU` - LRU eviction on/off (default: true)
    /// - `ENABLE_PERSISTENCE` - Snapshot persistence on/off (default: false)
    /// - `PERSISTENCE_KEY` - Snapshot namespace (default: app-cache)
    /// - `PERSISTENCE_DIR` - Snapshot directory (default: ./cache-data)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: parse_var("MAX_SIZE").unwrap_or(defaults.max_size),
            default_ttl_ms: parse_var("DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl_ms),
            enable_lru: parse_var("ENABLE_LRU").unwrap_or(defaults.enable_lru),
            enable_persistence: parse_var("ENABLE_PERSISTENCE")
                .unwrap_or(defaults.enable_persistence),
            persistence_key: env::var("PERSISTENCE_KEY")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.persistence_key),
            persistence_dir: env::var("PERSISTENCE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.persistence_dir),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval_ms: parse_var("CLEANUP_INTERVAL_MS")
                .unwrap_or(defaults.cleanup_interval_ms),
        }
    }

    /// Options for the cache the host serves.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            max_size: self.max_size,
            default_ttl: self.default_ttl_ms,
            enable_lru: self.enable_lru,
            enable_persistence: self.enable_persistence,
            persistence_key: self.persistence_key.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl_ms: DEFAULT_TTL_MS,
            enable_lru: true,
            enable_persistence: false,
            persistence_key: DEFAULT_PERSISTENCE_KEY.to_string(),
            persistence_dir: PathBuf::from("./cache-data"),
            server_port: 3000,
            cleanup_interval_ms: 1000,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_size, 100);
        assert_eq!(config.default_ttl_ms, 300_000);
        assert!(config.enable_lru);
        assert!(!config.enable_persistence);
        assert_eq!(config.persistence_key, "app-cache");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval_ms, 1000);
    }

    #[test]
    fn test_config_from_env_defaults() {
        for name in [
            "MAX_SIZE",
            "DEFAULT_TTL_MS",
            "ENABLE_LRU",
            "ENABLE_PERSISTENCE",
            "PERSISTENCE_KEY",
            "PERSISTENCE_DIR",
            "SERVER_PORT",
            "CLEANUP_INTERVAL_MS",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.max_size, 100);
        assert_eq!(config.default_ttl_ms, 300_000);
        assert!(config.enable_lru);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_cache_options_mapping() {
        let config = Config {
            max_size: 7,
            enable_persistence: true,
            persistence_key: "ns1".to_string(),
            ..Config::default()
        };

        let options = config.cache_options();
        assert_eq!(options.max_size, 7);
        assert_eq!(options.default_ttl, 300_000);
        assert!(options.enable_persistence);
        assert_eq!(options.persistence_key, "ns1");
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("ADVANCED_CACHE_TEST_GARBAGE", "not-a-number");
        assert_eq!(parse_var::<u64>("ADVANCED_CACHE_TEST_GARBAGE"), None);
        env::remove_var("ADVANCED_CACHE_TEST_GARBAGE");
    }
}
