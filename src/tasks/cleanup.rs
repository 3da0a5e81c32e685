//! TTL Cleanup Task
//!
//! Background task that periodically removes expired local entries, so dead
//! entries do not stay resident until their next lookup.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheService, CacheValue};

/// Spawns a background task that sweeps expired entries from the local tier.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Each sweep holds the local store lock only for the sweep
/// itself.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheService::local_only(1000, Duration::from_secs(300)));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V: CacheValue>(
    cache: Arc<CacheService<V>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.local().cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
                cache.log_stats();
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
