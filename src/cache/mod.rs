//! Cache Module
//!
//! Two-tier caching: a bounded local store with TTL expiration and LRU
//! eviction, a best-effort remote tier, the service composing both, and
//! memoization of computations on top.

mod entry;
mod key;
mod lru;
mod memoize;
pub(crate) mod remote;
mod service;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{CallArgs, KeyCodec, KEY_SEPARATOR};
pub use lru::AccessOrder;
pub use memoize::{MemoizeOptions, Memoized};
pub use remote::{RedisBackend, RemoteBackend, RemoteTier};
pub use service::{CacheService, CacheValue};
pub use stats::{hit_rate, LocalStats, Statistics, StatsSnapshot};
pub use store::LocalStore;

// == Public Constants ==
/// Maximum allowed key length in bytes on the HTTP surface
pub const MAX_KEY_LENGTH: usize = 256;

/// Default number of `set` calls between opportunistic expiry sweeps
pub const DEFAULT_SWEEP_EVERY: u64 = 100;
