//! Access Order Module
//!
//! Tracks key recency for least-recently-used eviction.

use std::collections::VecDeque;

// == Access Order ==
/// Recency list of cache keys.
///
/// - Front = least recently used
/// - Back = most recently used
#[derive(Debug, Default, Clone)]
pub struct AccessOrder {
    order: VecDeque<String>,
}

impl AccessOrder {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Moves `key` to the most-recently-used end, adding it if untracked.
    pub fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if pos + 1 == self.order.len() {
                return;
            }
            if let Some(existing) = self.order.remove(pos) {
                self.order.push_back(existing);
                return;
            }
        }
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Stops tracking `key`. Returns whether it was tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.order.iter().position(|k| k == key) {
            Some(pos) => {
                self.order.remove(pos);
                true
            }
            None => false,
        }
    }

    // == Pop Least Recent ==
    /// Removes and returns the least recently used key.
    pub fn pop_least_recent(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    /// Iterates keys from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
