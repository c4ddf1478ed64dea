//! Persistence Module
//!
//! Durable snapshot storage for cache contents and the snapshot codec.
//!
//! A snapshot is a JSON object mapping each cache key to its full entry
//! record: `{"key": {"data": .., "timestamp": .., "ttl": .., "hits": ..}}`.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cache::CacheEntry;
use crate::error::PersistenceError;

// == Persistence Backend Trait ==
/// Durable string key/value storage, one snapshot per namespace.
pub trait PersistenceBackend: Debug + Send + Sync {
    /// Reads the snapshot stored under `namespace`, if any.
    fn load(&self, namespace: &str) -> Result<Option<String>, PersistenceError>;

    /// Overwrites the snapshot stored under `namespace`.
    fn store(&self, namespace: &str, snapshot: &str) -> Result<(), PersistenceError>;
}

// == Memory Backend ==
/// Process-local backend. Clones share the same storage, so a snapshot
/// written by one cache can hydrate another.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw snapshot under `namespace`.
    pub fn raw(&self, namespace: &str) -> Option<String> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.get(namespace).cloned()
    }
}

impl PersistenceBackend for MemoryBackend {
    fn load(&self, namespace: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.raw(namespace))
    }

    fn store(&self, namespace: &str, snapshot: &str) -> Result<(), PersistenceError> {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.insert(namespace.to_string(), snapshot.to_string());
        Ok(())
    }
}

// == File Backend ==
/// Stores each namespace as `<dir>/<namespace>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolves the snapshot file for `namespace`, refusing names that
    /// would land outside `dir`.
    fn path_for(&self, namespace: &str) -> Result<PathBuf, PersistenceError> {
        let escapes = namespace.is_empty()
            || namespace.contains("..")
            || namespace.contains(['/', '\\'])
            || Path::new(namespace).is_absolute();
        if escapes {
            return Err(Self::io_error(
                namespace,
                std::io::Error::new(
                    ErrorKind::InvalidInput,
                    "namespace must be a plain file name",
                ),
            ));
        }
        Ok(self.dir.join(format!("{}.json", namespace)))
    }

    fn io_error(namespace: &str, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            namespace: namespace.to_string(),
            source,
        }
    }
}

impl PersistenceBackend for FileBackend {
    fn load(&self, namespace: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(namespace)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(namespace, e)),
        }
    }

    fn store(&self, namespace: &str, snapshot: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(namespace)?;
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(namespace, e))?;

        // Write then rename so readers never see a half-written snapshot
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, snapshot).map_err(|e| Self::io_error(namespace, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(namespace, e))
    }
}

// == Snapshot Codec ==
/// Serializes the full entry map.
pub fn encode_snapshot<V: Serialize>(
    entries: &HashMap<String, CacheEntry<V>>,
) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(entries)?)
}

/// Decodes a snapshot, keeping only entries that parse and are live at `now`.
///
/// A record that fails to decode is skipped on its own; it does not poison
/// the rest of the snapshot.
pub fn decode_snapshot<V: DeserializeOwned>(
    raw: &str,
    now: u64,
) -> Result<HashMap<String, CacheEntry<V>>, PersistenceError> {
    let records: Map<String, Value> = serde_json::from_str(raw)?;
    let total = records.len();

    let mut entries = HashMap::with_capacity(total);
    let mut malformed = 0usize;
    let mut expired = 0usize;

    for (key, record) in records {
        match serde_json::from_value::<CacheEntry<V>>(record) {
            Ok(entry) if entry.is_expired(now) => expired += 1,
            Ok(entry) => {
                entries.insert(key, entry);
            }
            Err(e) => {
                malformed += 1;
                debug!("Skipping unreadable snapshot record '{}': {}", key, e);
            }
        }
    }

    if malformed > 0 {
        warn!(
            "Snapshot contained {} unreadable records out of {}",
            malformed, total
        );
    }
    debug!(
        "Decoded snapshot: {} live, {} expired, {} unreadable",
        entries.len(),
        expired,
        malformed
    );

    Ok(entries)
}
