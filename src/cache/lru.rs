//! Access Order Module
//!
//! Tracks recency of local-store keys for LRU eviction.

use std::collections::{BTreeMap, HashMap};

// == Access Order ==
/// Total order of live keys by last access.
///
/// Every touch stamps the key with a fresh, strictly increasing sequence
/// number. `by_stamp` keeps keys sorted by stamp, so its first entry is the
/// least recently used key and its last entry the most recently used one.
/// `stamps` maps each key back to its current stamp, keeping touch, remove
/// and pop logarithmic in the number of keys.
#[derive(Debug, Default)]
pub struct AccessOrder {
    stamps: HashMap<String, u64>,
    by_stamp: BTreeMap<u64, String>,
    next_stamp: u64,
}

impl AccessOrder {
    // == Constructor ==
    /// Creates a new empty access order.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &str) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;

        match self.stamps.get_mut(key) {
            Some(current) => {
                if let Some(owned) = self.by_stamp.remove(&*current) {
                    self.by_stamp.insert(stamp, owned);
                }
                *current = stamp;
            }
            None => {
                self.stamps.insert(key.to_string(), stamp);
                self.by_stamp.insert(stamp, key.to_string());
            }
        }
    }

    // == Remove ==
    /// Removes a key from the order. Returns whether it was tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.stamps.remove(key) {
            Some(stamp) => {
                self.by_stamp.remove(&stamp);
                true
            }
            None => false,
        }
    }

    // == Pop LRU ==
    /// Returns and removes the least recently used key.
    pub fn pop_lru(&mut self) -> Option<String> {
        let (_, key) = self.by_stamp.pop_first()?;
        self.stamps.remove(&key);
        Some(key)
    }

    /// Returns the least recently used key without removing it.
    pub fn peek_lru(&self) -> Option<&str> {
        self.by_stamp.values().next().map(String::as_str)
    }

    /// Iterates keys from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.by_stamp.values().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.stamps.clear();
        self.by_stamp.clear();
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.stamps.contains_key(key)
    }
}
