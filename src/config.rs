//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use crate::cache::DEFAULT_SWEEP_EVERY;

/// Local tier parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalConfig {
    /// Maximum number of entries before LRU eviction begins
    pub max_size: usize,
    /// TTL applied to writes without an explicit TTL (zero = no expiry)
    pub default_ttl: Duration,
    /// `set` calls between opportunistic expiry sweeps (0 = never)
    pub sweep_every: u64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            default_ttl: Duration::from_secs(3600),
            sweep_every: DEFAULT_SWEEP_EVERY,
        }
    }
}

/// Remote (Redis) tier parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    /// Whether the remote tier attempts to connect at all
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub db: u32,
    pub password: Option<String>,
    /// Upper bound for connecting and for every single remote call
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Connection parameters for the Redis client.
    ///
    /// Built field by field rather than as a `redis://` URL, so a password
    /// containing `@`, `:` or `/` is passed through untouched.
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: i64::from(self.db),
                password: self.password.clone(),
                ..RedisConnectionInfo::default()
            },
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            password: None,
            timeout: Duration::from_millis(500),
        }
    }
}

/// Application configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub local: LocalConfig,
    pub remote: RemoteConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds (0 = no task)
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SIZE` - Maximum local entries (default: 1000)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_SWEEP_EVERY` - Sets between expiry sweeps (default: 100)
    /// - `REDIS_ENABLED` - Enable the remote tier (default: false)
    /// - `REDIS_HOST` / `REDIS_PORT` / `REDIS_DB` - Remote address (default: localhost:6379/0)
    /// - `REDIS_PASSWORD` - Remote credentials (default: none)
    /// - `REDIS_TIMEOUT_MS` - Remote call timeout (default: 500)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            local: LocalConfig {
                max_size: env_or("CACHE_SIZE", defaults.local.max_size),
                default_ttl: Duration::from_secs(env_or(
                    "CACHE_DEFAULT_TTL",
                    defaults.local.default_ttl.as_secs(),
                )),
                sweep_every: env_or("CACHE_SWEEP_EVERY", defaults.local.sweep_every),
            },
            remote: RemoteConfig {
                enabled: env_flag("REDIS_ENABLED", defaults.remote.enabled),
                host: env::var("REDIS_HOST").unwrap_or(defaults.remote.host),
                port: env_or("REDIS_PORT", defaults.remote.port),
                db: env_or("REDIS_DB", defaults.remote.db),
                password: env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()),
                timeout: Duration::from_millis(env_or(
                    "REDIS_TIMEOUT_MS",
                    defaults.remote.timeout.as_millis() as u64,
                )),
            },
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local: LocalConfig::default(),
            remote: RemoteConfig::default(),
            server_port: 3000,
            cleanup_interval: 60,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
