//! Cache Service Module
//!
//! Composes the local store and the remote tier behind one contract:
//! writes go to both tiers, reads try remote first and fall back to local.
//! Remote I/O always happens outside the local store lock.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::cache::{
    CallArgs, KeyCodec, LocalStore, MemoizeOptions, Memoized, RemoteTier, Statistics,
    StatsSnapshot,
};
use crate::config::Config;

// == Cache Value ==
/// Bound for values a cache service can hold: cloneable for the local tier
/// and JSON-representable for the remote tier.
pub trait CacheValue: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

// == Cache Service ==
/// Two-tier cache with hit/miss/set accounting.
///
/// Construct one per application and share it behind an `Arc`.
#[derive(Debug)]
pub struct CacheService<V = Value> {
    local: LocalStore<V>,
    remote: RemoteTier,
    stats: Statistics,
}

impl<V: CacheValue> CacheService<V> {
    // == Constructors ==
    pub fn new(local: LocalStore<V>, remote: RemoteTier) -> Self {
        Self {
            local,
            remote,
            stats: Statistics::new(),
        }
    }

    /// A service whose remote tier is disabled.
    pub fn local_only(max_size: usize, default_ttl: Duration) -> Self {
        Self::new(LocalStore::new(max_size, default_ttl), RemoteTier::disabled())
    }

    /// Builds both tiers from configuration, connecting the remote tier if enabled.
    pub async fn from_config(config: &Config) -> Self {
        let local = LocalStore::new(config.local.max_size, config.local.default_ttl)
            .with_sweep_every(config.local.sweep_every);
        let remote = RemoteTier::connect(&config.remote).await;
        Self::new(local, remote)
    }

    pub fn local(&self) -> &LocalStore<V> {
        &self.local
    }

    pub fn remote(&self) -> &RemoteTier {
        &self.remote
    }

    // == Get ==
    /// Remote first, then local. Counts one hit or one miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        if let Some(value) = self.remote.get(key).await {
            self.stats.record_hit();
            return Some(value);
        }

        match self.local.get(key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Writes both tiers regardless of the remote outcome.
    ///
    /// `ttl` of None uses the local default TTL for both tiers, so they
    /// expire together.
    pub async fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        self.stats.record_set();

        let ttl = ttl.unwrap_or(self.local.default_ttl());
        self.remote.set(key, &value, Some(ttl)).await;
        self.local.set(key, value, Some(ttl));
    }

    // == Delete ==
    /// Deletes from both tiers. True if either had the key.
    pub async fn delete(&self, key: &str) -> bool {
        let remote_deleted = self.remote.delete(key).await;
        let local_deleted = self.local.delete(key);
        remote_deleted || local_deleted
    }

    // == Clear ==
    /// Without a pattern, empties both tiers.
    ///
    /// With a glob pattern, deletes the matching local keys from both tiers.
    /// Remote keys that were never written through this process are not
    /// enumerated.
    pub async fn clear(&self, pattern: Option<&str>) {
        match pattern {
            Some(pattern) => {
                for key in self.local.keys(Some(pattern)) {
                    self.delete(&key).await;
                }
            }
            None => {
                self.remote.clear().await;
                self.local.clear();
            }
        }
    }

    /// Invalidates every key matching `pattern`.
    pub async fn invalidate(&self, pattern: &str) {
        self.clear(Some(pattern)).await;
    }

    /// Live local keys, optionally glob-filtered.
    pub fn keys(&self, pattern: Option<&str>) -> Vec<String> {
        self.local.keys(pattern)
    }

    // == Stats ==
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::new(&self.stats, self.local.stats(), self.remote.is_enabled())
    }

    pub fn log_stats(&self) {
        let stats = self.stats();
        info!(
            "Cache stats: hits={}, misses={}, sets={}, hit_rate={:.2}%, local_size={}/{}, remote_enabled={}",
            stats.hits,
            stats.misses,
            stats.sets,
            stats.hit_rate * 100.0,
            stats.local.size,
            stats.local.max_size,
            stats.remote_enabled
        );
    }

    // == Warm Up ==
    /// Preloads entries, typically at startup.
    pub async fn warm_up<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, V, Option<Duration>)>,
    {
        let mut count = 0usize;
        for (key, value, ttl) in entries {
            self.set(&key, value, ttl).await;
            count += 1;
        }
        info!("Cache warm-up completed: {} entries loaded", count);
    }

    // == Keys ==
    /// Key for a call, as used by memoized computations.
    pub fn derive_key(namespace: &str, call: &CallArgs) -> String {
        KeyCodec::derive_call(namespace, call)
    }

    // == Memoize ==
    /// Wraps `func` so its results are cached under `options`.
    pub fn memoize<F, Fut>(self: &Arc<Self>, options: MemoizeOptions, func: F) -> Memoized<V, F>
    where
        F: Fn(CallArgs) -> Fut,
        Fut: Future,
    {
        Memoized::new(Arc::clone(self), options, func)
    }
}
