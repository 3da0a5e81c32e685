//! Memoize Module
//!
//! Higher-order wrapper that caches the results of a computation in a
//! [`CacheService`], keyed by its namespace and call arguments.
//!
//! Execution is at-least-once per key and TTL window: two callers that miss
//! on the same key at the same time both run the computation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheService, CacheValue, CallArgs, KeyCodec};

// == Memoize Options ==
/// How a memoized computation derives its cache key and how long results live.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoizeOptions {
    pub namespace: String,
    /// TTL of cached results; None uses the service default
    pub ttl: Option<Duration>,
    /// Include positional arguments in the key
    pub use_positional_args: bool,
    /// Include keyword arguments in the key
    pub use_keyword_args: bool,
}

impl MemoizeOptions {
    pub fn new(namespace: impl Into<String>, ttl: Duration) -> Self {
        Self {
            namespace: namespace.into(),
            ttl: Some(ttl),
            use_positional_args: true,
            use_keyword_args: true,
        }
    }

    /// Leaves positional arguments out of the key.
    pub fn ignore_positional_args(mut self) -> Self {
        self.use_positional_args = false;
        self
    }

    /// Leaves keyword arguments out of the key, e.g. logging-only parameters.
    pub fn ignore_keyword_args(mut self) -> Self {
        self.use_keyword_args = false;
        self
    }

    /// Cache key for a call under these options.
    ///
    /// With both argument kinds ignored the key is the bare namespace.
    pub fn key_for(&self, call: &CallArgs) -> String {
        let args: &[Value] = if self.use_positional_args {
            call.positional()
        } else {
            &[]
        };
        let kwargs = call
            .keyword()
            .iter()
            .filter(|_| self.use_keyword_args)
            .map(|(name, value)| (name.as_str(), value));

        KeyCodec::derive(&self.namespace, args, kwargs)
    }
}

// == Memoized ==
/// A computation wrapped with cache lookups.
pub struct Memoized<V, F> {
    cache: Arc<CacheService<V>>,
    options: MemoizeOptions,
    func: F,
}

impl<V, F> Memoized<V, F> {
    pub fn new(cache: Arc<CacheService<V>>, options: MemoizeOptions, func: F) -> Self {
        Self {
            cache,
            options,
            func,
        }
    }

    pub fn options(&self) -> &MemoizeOptions {
        &self.options
    }
}

impl<V, F, Fut> Memoized<V, F>
where
    V: CacheValue,
    F: Fn(CallArgs) -> Fut,
    Fut: Future<Output = V>,
{
    /// Returns the cached result for `call`, computing and storing it on a miss.
    pub async fn call(&self, call: CallArgs) -> V {
        let key = self.options.key_for(&call);

        if let Some(cached) = self.cache.get(&key).await {
            debug!("Cache hit for {}: {}", self.options.namespace, key);
            return cached;
        }

        debug!("Cache miss for {}: {}", self.options.namespace, key);
        let result = (self.func)(call).await;
        self.cache.set(&key, result.clone(), self.options.ttl).await;
        result
    }
}

impl<V, F> Memoized<V, F>
where
    V: CacheValue,
{
    /// Like [`Memoized::call`] for fallible computations: only `Ok` results
    /// are cached, errors are returned to the caller untouched.
    pub async fn try_call<E, Fut>(&self, call: CallArgs) -> Result<V, E>
    where
        F: Fn(CallArgs) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = self.options.key_for(&call);

        if let Some(cached) = self.cache.get(&key).await {
            debug!("Cache hit for {}: {}", self.options.namespace, key);
            return Ok(cached);
        }

        debug!("Cache miss for {}: {}", self.options.namespace, key);
        let result = (self.func)(call).await?;
        self.cache.set(&key, result.clone(), self.options.ttl).await;
        Ok(result)
    }
}
