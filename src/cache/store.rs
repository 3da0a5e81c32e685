//! Local Store Module
//!
//! Bounded in-process tier combining HashMap storage with LRU tracking and
//! TTL expiration behind a single mutex.

use std::collections::HashMap;
use std::time::Duration;

use glob::Pattern;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::cache::{AccessOrder, CacheEntry, LocalStats};

// == Store State ==
/// Everything guarded by the store lock.
///
/// Invariant: `entries` and `order` hold exactly the same key set whenever
/// the lock is released.
#[derive(Debug)]
struct StoreState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: AccessOrder,
    /// `set` calls since creation, drives the opportunistic sweep
    set_calls: u64,
    evictions: u64,
    expirations: u64,
}

impl<V> StoreState<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: AccessOrder::new(),
            set_calls: 0,
            evictions: 0,
            expirations: 0,
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    fn remove_expired(&mut self, now: Instant) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove(key);
        }

        self.expirations += expired_keys.len() as u64;
        expired_keys.len()
    }
}

// == Local Store ==
/// In-process cache tier with LRU eviction and TTL support.
///
/// Every operation takes the internal lock for its own duration only, so the
/// store can be shared by reference across threads and tasks.
#[derive(Debug)]
pub struct LocalStore<V> {
    state: Mutex<StoreState<V>>,
    max_size: usize,
    default_ttl: Duration,
    sweep_every: u64,
}

impl<V: Clone> LocalStore<V> {
    // == Constructor ==
    /// Creates a store holding at most `max_size` entries.
    ///
    /// A zero `default_ttl` means entries set without a TTL never expire.
    /// `max_size` is clamped to at least one entry.
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            state: Mutex::new(StoreState::new()),
            max_size: max_size.max(1),
            default_ttl,
            sweep_every: crate::cache::DEFAULT_SWEEP_EVERY,
        }
    }

    /// Sets how many `set` calls pass between full expiry sweeps (0 = never).
    pub fn with_sweep_every(mut self, sweep_every: u64) -> Self {
        self.sweep_every = sweep_every;
        self
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// An expired entry is dropped as a side effect; a hit marks the key as
    /// most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut state = self.state.lock();
        let now = Instant::now();

        let expired = state.entries.get(key)?.is_expired_at(now);
        if expired {
            state.remove(key);
            state.expirations += 1;
            return None;
        }

        state.order.touch(key);
        state.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value, replacing any existing entry for the key.
    ///
    /// `ttl` of None uses the store default; a zero TTL disables expiry.
    /// When the store is full and the key is new, least recently used keys
    /// are evicted until one slot is free.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let mut state = self.state.lock();

        state.set_calls += 1;
        if self.sweep_every > 0 && state.set_calls % self.sweep_every == 0 {
            state.remove_expired(Instant::now());
        }

        if !state.entries.contains_key(&key) {
            while state.entries.len() >= self.max_size {
                let Some(victim) = state.order.pop_lru() else {
                    break;
                };
                state.entries.remove(&victim);
                state.evictions += 1;
            }
        }

        let entry = CacheEntry::new(value, Some(ttl.unwrap_or(self.default_ttl)));
        state.entries.insert(key.clone(), entry);
        state.order.touch(&key);
    }

    // == Delete ==
    /// Removes a key. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.state.lock().remove(key)
    }

    // == Clear ==
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
    }

    // == Keys ==
    /// Returns live keys from least to most recently used, optionally
    /// filtered by a shell-style glob (`*`, `?`, `[...]`).
    ///
    /// A pattern that is not a valid glob only matches itself literally.
    pub fn keys(&self, pattern: Option<&str>) -> Vec<String> {
        let mut state = self.state.lock();
        state.remove_expired(Instant::now());

        let matcher = pattern.map(KeyMatcher::new);
        state
            .order
            .iter()
            .filter(|key| matcher.as_ref().map_or(true, |m| m.matches(key)))
            .map(str::to_string)
            .collect()
    }

    // == Size ==
    /// Number of live entries.
    pub fn size(&self) -> usize {
        let mut state = self.state.lock();
        state.remove_expired(Instant::now());
        state.entries.len()
    }

    // == Stats ==
    pub fn stats(&self) -> LocalStats {
        let mut state = self.state.lock();
        state.remove_expired(Instant::now());
        LocalStats {
            size: state.entries.len(),
            max_size: self.max_size,
            evictions: state.evictions,
            expirations: state.expirations,
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        self.state.lock().remove_expired(Instant::now())
    }

    /// Number of stored entries, including expired ones not yet swept.
    #[cfg(test)]
    pub(crate) fn raw_len(&self) -> usize {
        let state = self.state.lock();
        debug_assert_eq!(state.entries.len(), state.order.len());
        state.entries.len()
    }

    /// Checks that the map and the access order hold the same key set.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let state = self.state.lock();
        state.entries.len() == state.order.len()
            && state.order.iter().all(|key| state.entries.contains_key(key))
    }
}

// == Key Matcher ==
enum KeyMatcher<'a> {
    Glob(Pattern),
    Literal(&'a str),
}

impl<'a> KeyMatcher<'a> {
    fn new(pattern: &'a str) -> Self {
        match Pattern::new(pattern) {
            Ok(glob) => KeyMatcher::Glob(glob),
            Err(e) => {
                tracing::debug!("Invalid key pattern '{}': {}, matching literally", pattern, e);
                KeyMatcher::Literal(pattern)
            }
        }
    }

    fn matches(&self, key: &str) -> bool {
        match self {
            KeyMatcher::Glob(glob) => glob.matches(key),
            KeyMatcher::Literal(literal) => *literal == key,
        }
    }
}
