//! Cache Statistics Module
//!
//! Aggregate counters computed over the live entry set.

use serde::{Deserialize, Serialize};

// == Cache Stats ==
/// Point-in-time statistics for a cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of live entries
    pub size: usize,
    /// Configured entry ceiling
    pub max_size: usize,
    /// Sum of per-entry hit counters
    pub total_hits: u64,
    /// Mean hits per live entry
    pub avg_hits: f64,
    /// `total_hits / (total_hits + size)`
    pub hit_rate: f64,
}

impl CacheStats {
    // == Constructor ==
    /// Builds stats from the per-entry hit counters of the live set.
    pub fn from_hits<I>(hits: I, max_size: usize) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let (size, total_hits) = hits
            .into_iter()
            .fold((0usize, 0u64), |(n, sum), h| (n + 1, sum + h));

        Self {
            size,
            max_size,
            total_hits,
            avg_hits: avg_hits(total_hits, size),
            hit_rate: hit_rate(total_hits, size),
        }
    }
}

// == Average Hits ==
fn avg_hits(total_hits: u64, size: usize) -> f64 {
    if size == 0 {
        0.0
    } else {
        total_hits as f64 / size as f64
    }
}

// == Hit Rate ==
/// Ratio of hits to hits plus live entries.
///
/// Misses are not counted; each live entry stands in for one miss.
fn hit_rate(total_hits: u64, size: usize) -> f64 {
    let denominator = total_hits + size as u64;
    if denominator == 0 {
        0.0
    } else {
        total_hits as f64 / denominator as f64
    }
}
