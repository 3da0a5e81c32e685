//! Remote Tier Module
//!
//! Best-effort client to an external key-value service. The tier connects
//! once; if that fails it stays disabled and every operation becomes a
//! silent no-op. Once enabled, each call is guarded on its own: a failure
//! degrades that call only and is logged.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, IntoConnectionInfo};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time;
use tracing::{error, info, warn};

use crate::config::RemoteConfig;
use crate::error::RemoteError;

// == Remote Backend ==
/// Transport for the remote tier. Payloads are JSON text.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Liveness check issued once at construction.
    async fn ping(&self) -> Result<(), RemoteError>;

    async fn get(&self, key: &str) -> Result<Option<String>, RemoteError>;

    /// Stores a payload; `None` means no expiry.
    async fn set(&self, key: &str, payload: String, ttl: Option<Duration>)
        -> Result<(), RemoteError>;

    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, RemoteError>;

    /// Drops every key of the selected database.
    async fn flush(&self) -> Result<(), RemoteError>;
}

// == Redis Backend ==
/// Redis transport over a multiplexed, auto-reconnecting connection.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    pub async fn connect<T: IntoConnectionInfo>(info: T) -> Result<Self, RemoteError> {
        let client = redis::Client::open(info)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

impl fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBackend").finish_non_exhaustive()
    }
}

#[async_trait]
impl RemoteBackend for RedisBackend {
    async fn ping(&self) -> Result<(), RemoteError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(key).await?;
        Ok(payload)
    }

    async fn set(
        &self,
        key: &str,
        payload: String,
        ttl: Option<Duration>,
    ) -> Result<(), RemoteError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(payload);
        if let Some(ttl) = ttl.filter(|ttl| !ttl.is_zero()) {
            // EX takes whole seconds; round sub-second TTLs up
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, RemoteError> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn flush(&self) -> Result<(), RemoteError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        Ok(())
    }
}

// == Remote Tier ==
/// Optional remote cache tier.
///
/// `backend` is None when the tier is disabled. There is no automatic
/// reconnect; a disabled tier stays disabled for the life of this value.
pub struct RemoteTier {
    backend: Option<Arc<dyn RemoteBackend>>,
    timeout: Duration,
}

impl RemoteTier {
    /// A tier that never connects.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            timeout: Duration::ZERO,
        }
    }

    /// Connects to Redis per configuration, falling back to disabled.
    pub async fn connect(config: &RemoteConfig) -> Self {
        if !config.enabled {
            info!("Remote cache tier disabled by configuration");
            return Self::disabled();
        }

        let connect = RedisBackend::connect(config.connection_info());
        match time::timeout(config.timeout, connect).await {
            Ok(Ok(backend)) => Self::with_backend(Arc::new(backend), config.timeout).await,
            Ok(Err(e)) => {
                warn!("Remote cache connection failed: {}, using local cache only", e);
                Self::disabled()
            }
            Err(_) => {
                warn!(
                    "Remote cache connection failed: {}, using local cache only",
                    RemoteError::Timeout(config.timeout)
                );
                Self::disabled()
            }
        }
    }

    /// Wraps a backend after a successful ping; disabled if the ping fails.
    pub async fn with_backend(backend: Arc<dyn RemoteBackend>, timeout: Duration) -> Self {
        let ping = match time::timeout(timeout, backend.ping()).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(timeout)),
        };

        match ping {
            Ok(()) => {
                info!("Remote cache tier initialized");
                Self {
                    backend: Some(backend),
                    timeout,
                }
            }
            Err(e) => {
                warn!("Remote cache ping failed: {}, using local cache only", e);
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    // == Get ==
    /// Fetches and decodes a value. Any failure reads as a miss.
    pub async fn get<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        let backend = self.backend.as_ref()?;
        let payload = self.guarded("get", key, backend.get(key)).await??;

        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Remote cache get error for '{}': {}", key, RemoteError::from(e));
                None
            }
        }
    }

    // == Set ==
    /// Encodes and stores a value. Returns whether the write was acknowledged.
    pub async fn set<V: Serialize>(&self, key: &str, value: &V, ttl: Option<Duration>) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Remote cache set error for '{}': {}", key, RemoteError::from(e));
                return false;
            }
        };

        self.guarded("set", key, backend.set(key, payload, ttl))
            .await
            .is_some()
    }

    // == Delete ==
    pub async fn delete(&self, key: &str) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };
        self.guarded("delete", key, backend.delete(key))
            .await
            .unwrap_or(false)
    }

    // == Clear ==
    pub async fn clear(&self) {
        if let Some(backend) = self.backend.as_ref() {
            self.guarded("clear", "*", backend.flush()).await;
        }
    }

    /// Runs one backend call under the timeout, logging any failure.
    async fn guarded<T, F>(&self, op: &str, key: &str, call: F) -> Option<T>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        let result = match time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(self.timeout)),
        };

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Remote cache {} error for '{}': {}", op, key, e);
                None
            }
        }
    }
}

impl fmt::Debug for RemoteTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTier")
            .field("enabled", &self.is_enabled())
            .field("timeout", &self.timeout)
            .finish()
    }
}
