//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A single cached value with its write time, lifetime and hit counter.
///
/// This is also the persisted record shape, so field names are part of the
/// snapshot format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub data: V,
    /// Write timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Lifetime in milliseconds, counted from `timestamp`
    pub ttl: u64,
    /// Successful reads since the last write
    #[serde(default)]
    pub hits: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry written at `now` with zero hits.
    pub fn new(data: V, now: u64, ttl: u64) -> Self {
        Self {
            data,
            timestamp: now,
            ttl,
            hits: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Expiry is strict: an entry is still live when exactly `ttl` ms have
    /// elapsed and expires on the next millisecond.
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.timestamp) > self.ttl
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("test_value".to_string(), 1_000, 60_000);

        assert_eq!(entry.data, "test_value");
        assert_eq!(entry.timestamp, 1_000);
        assert_eq!(entry.ttl, 60_000);
        assert_eq!(entry.hits, 0);
        assert!(!entry.is_expired(1_000));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(1u32, 1_000, 100);

        // Exactly ttl elapsed is still live, one more ms is not
        assert!(!entry.is_expired(1_100));
        assert!(entry.is_expired(1_101));
    }

    #[test]
    fn test_clock_behind_timestamp_is_not_expired() {
        let entry = CacheEntry::new(1u32, 5_000, 10);
        assert!(!entry.is_expired(1_000));
    }

    #[test]
    fn test_entry_deserialize_without_hits() {
        let json = r#"{"data": 42, "timestamp": 10, "ttl": 20}"#;
        let entry: CacheEntry<u32> = serde_json::from_str(json).unwrap();

        assert_eq!(entry.data, 42);
        assert_eq!(entry.hits, 0);
    }

    #[test]
    fn test_entry_deserialize_ignores_unknown_fields() {
        let json = r#"{"data": "x", "timestamp": 10, "ttl": 20, "hits": 3, "version": 2}"#;
        let entry: CacheEntry<String> = serde_json::from_str(json).unwrap();

        assert_eq!(entry.hits, 3);
    }

    #[test]
    fn test_entry_missing_timestamp_fails() {
        let json = r#"{"data": "x", "ttl": 20}"#;
        assert!(serde_json::from_str::<CacheEntry<String>>(json).is_err());
    }
}
