//! Advanced Cache Module
//!
//! Main cache engine combining HashMap storage with access-order tracking,
//! TTL expiration and snapshot persistence.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::persistence::{decode_snapshot, encode_snapshot, PersistenceBackend};
use crate::cache::{AccessOrder, CacheEntry, CacheOptions, CacheStats};
use crate::clock::{system_clock, SharedClock};

// == Advanced Cache ==
/// Key/value cache with per-entry TTL, optional LRU eviction and optional
/// snapshot persistence.
///
/// Every operation first purges all expired entries. No operation fails:
/// persistence problems are logged and the in-memory state stays
/// authoritative.
#[derive(Debug)]
pub struct AdvancedCache<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Recency order, only maintained with LRU enabled
    order: AccessOrder,
    options: CacheOptions,
    clock: SharedClock,
    /// Snapshot storage, present only when persistence is active
    backend: Option<Arc<dyn PersistenceBackend>>,
}

impl<V> AdvancedCache<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    // == Constructors ==
    /// Creates an in-memory cache on the system clock.
    pub fn new(options: CacheOptions) -> Self {
        Self::build(options, system_clock(), None)
    }

    /// Creates an in-memory cache reading time from `clock`.
    pub fn with_clock(options: CacheOptions, clock: SharedClock) -> Self {
        Self::build(options, clock, None)
    }

    /// Creates a cache, hydrating from `backend` when persistence is enabled.
    ///
    /// A backend passed with persistence disabled is ignored, and enabling
    /// persistence without a backend leaves the cache memory-only.
    pub fn build(
        options: CacheOptions,
        clock: SharedClock,
        backend: Option<Arc<dyn PersistenceBackend>>,
    ) -> Self {
        let backend = match (options.enable_persistence, backend) {
            (true, Some(backend)) => Some(backend),
            (true, None) => {
                warn!(
                    "Persistence enabled for '{}' without a backend; cache is memory-only",
                    options.persistence_key
                );
                None
            }
            (false, _) => None,
        };

        let mut cache = Self {
            entries: HashMap::new(),
            order: AccessOrder::new(),
            options,
            clock,
            backend,
        };
        cache.hydrate();
        cache
    }

    // == Set ==
    /// Stores `data` under `key`, replacing any previous entry.
    ///
    /// The new entry starts with zero hits. With LRU enabled, inserting past
    /// `max_size` evicts the least recently used keys.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `data` - The value to store
    /// * `ttl` - Optional TTL in milliseconds (uses `default_ttl` if None)
    pub fn set(&mut self, key: impl Into<String>, data: V, ttl: Option<u64>) {
        let key = key.into();
        let now = self.clock.now_ms();
        self.purge_at(now);

        let ttl = ttl.unwrap_or(self.options.default_ttl);
        self.entries.insert(key.clone(), CacheEntry::new(data, now, ttl));

        if self.options.enable_lru {
            self.order.touch(&key);
            self.evict_overflow();
        }

        self.persist();
    }

    // == Get ==
    /// Returns a clone of the live value under `key`.
    ///
    /// A hit increments the entry's hit counter and marks it most recently
    /// used.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let purged = self.purge_at(self.clock.now_ms());

        let now = self.clock.now_ms();
        let expired = match self.entries.get(key) {
            None => {
                if purged > 0 {
                    self.persist();
                }
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            self.entries.remove(key);
            self.order.remove(key);
            self.persist();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.hits += 1;
        let data = entry.data.clone();

        if self.options.enable_lru {
            self.order.touch(key);
        }
        if purged > 0 {
            self.persist();
        }
        Some(data)
    }

    // == Has ==
    /// Reports whether a live entry exists, without touching it.
    pub fn has(&mut self, key: &str) -> bool {
        if self.purge_at(self.clock.now_ms()) > 0 {
            self.persist();
        }
        self.entries.contains_key(key)
    }

    // == Remove ==
    /// Deletes `key`. Returns whether an entry was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.order.remove(key);
        if removed {
            self.persist();
        }
        removed
    }

    // == Clear ==
    /// Removes every entry and persists the empty snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.persist();
    }

    // == Stats ==
    /// Returns statistics over the live entry set.
    pub fn stats(&mut self) -> CacheStats {
        if self.purge_at(self.clock.now_ms()) > 0 {
            self.persist();
        }
        CacheStats::from_hits(
            self.entries.values().map(|entry| entry.hits),
            self.options.max_size,
        )
    }

    // == Purge Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn purge_expired(&mut self) -> usize {
        let removed = self.purge_at(self.clock.now_ms());
        if removed > 0 {
            self.persist();
        }
        removed
    }

    // == Keys ==
    /// Returns live keys, least recently used first when LRU is enabled.
    pub fn keys(&mut self) -> Vec<String> {
        if self.purge_at(self.clock.now_ms()) > 0 {
            self.persist();
        }
        if self.options.enable_lru {
            self.order.iter().map(str::to_string).collect()
        } else {
            self.entries.keys().cloned().collect()
        }
    }

    /// Returns the number of entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Returns whether snapshots are being written.
    pub fn is_persistent(&self) -> bool {
        self.backend.is_some()
    }

    // == Internals ==
    fn purge_at(&mut self, now: u64) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.order.remove(key);
        }

        expired_keys.len()
    }

    fn evict_overflow(&mut self) {
        let mut evicted = 0usize;
        while self.entries.len() > self.options.max_size {
            match self.order.pop_least_recent() {
                Some(key) => {
                    self.entries.remove(&key);
                    evicted += 1;
                }
                None => break,
            }
        }
        if evicted > 0 {
            debug!(
                "LRU evicted {} entries (max_size={})",
                evicted, self.options.max_size
            );
        }
    }

    fn hydrate(&mut self) {
        let Some(backend) = &self.backend else {
            return;
        };
        let namespace = &self.options.persistence_key;

        let raw = match backend.load(namespace) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to load cache snapshot '{}': {}", namespace, e);
                return;
            }
        };

        match decode_snapshot::<V>(&raw, self.clock.now_ms()) {
            Ok(entries) => {
                debug!(
                    "Hydrated {} entries from snapshot '{}'",
                    entries.len(),
                    namespace
                );
                let mut by_age: Vec<(&String, u64)> =
                    entries.iter().map(|(k, e)| (k, e.timestamp)).collect();
                by_age.sort_by_key(|(_, ts)| *ts);
                if self.options.enable_lru {
                    for (key, _) in by_age {
                        self.order.touch(key);
                    }
                }
                self.entries = entries;
            }
            Err(e) => warn!("Ignoring unreadable cache snapshot '{}': {}", namespace, e),
        }
    }

    fn persist(&self) {
        let Some(backend) = &self.backend else {
            return;
        };
        let namespace = &self.options.persistence_key;

        let result = encode_snapshot(&self.entries)
            .and_then(|snapshot| backend.store(namespace, &snapshot));
        if let Err(e) = result {
            warn!("Failed to persist cache snapshot '{}': {}", namespace, e);
        }
    }
}
