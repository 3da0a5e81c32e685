//! Cache Statistics Module
//!
//! Process-wide request counters for the cache service plus the snapshot
//! types reported to operators.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Statistics ==
/// Monotonic hit/miss/set counters shared by all callers of a cache service.
#[derive(Debug, Default)]
pub struct Statistics {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::Relaxed)
    }
}

// == Hit Rate ==
/// Returns hits / (hits + misses), or 0.0 if no requests have been made.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

// == Local Stats ==
/// Occupancy of the local tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalStats {
    /// Live entries
    pub size: usize,
    /// Capacity before LRU eviction begins
    pub max_size: usize,
    /// Entries dropped by LRU eviction
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
}

// == Stats Snapshot ==
/// Point-in-time view of a cache service.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    /// hits / (hits + misses), 0.0 before any request
    pub hit_rate: f64,
    pub local: LocalStats,
    pub remote_enabled: bool,
}

impl StatsSnapshot {
    pub fn new(stats: &Statistics, local: LocalStats, remote_enabled: bool) -> Self {
        let hits = stats.hits();
        let misses = stats.misses();
        Self {
            hits,
            misses,
            sets: stats.sets(),
            hit_rate: hit_rate(hits, misses),
            local,
            remote_enabled,
        }
    }
}
