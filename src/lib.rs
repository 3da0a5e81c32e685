//! tiercache - A two-tier cache for expensive computations
//!
//! A bounded in-process store with TTL expiry and LRU eviction, an optional
//! best-effort Redis tier, and a memoizer that caches call results under
//! deterministic keys. An operator HTTP API exposes the cache for inspection.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{
    CacheService, CacheValue, CallArgs, KeyCodec, LocalStore, MemoizeOptions, Memoized,
    RemoteBackend, RemoteTier, StatsSnapshot,
};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
