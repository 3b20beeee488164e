//! Read-through caching of fetch operations.

use super::keys::{build_key, Call};
use super::metrics::CacheMetrics;
use super::{codec, CacheBackend, CacheError, CacheHandle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Custom key derivation. Its output is used verbatim.
pub type KeyBuilder = Arc<dyn Fn(&'static str, &Call) -> String + Send + Sync>;

/// Read-through wrapper for one fetch operation.
///
/// On a hit the stored value is returned and the operation does not run. On
/// a miss, or on any cache-layer failure, the operation runs exactly once and
/// a non-null result is written back with the configured TTL. Errors from the
/// operation itself are returned unchanged and nothing is written.
///
/// Concurrent misses on one key all run the operation; the last write wins.
#[derive(Clone)]
pub struct ReadThrough {
    prefix: &'static str,
    ttl: Duration,
    key_builder: Option<KeyBuilder>,
}

impl ReadThrough {
    /// Caches under `prefix` for `ttl_secs` seconds.
    #[must_use]
    pub fn new(prefix: &'static str, ttl_secs: u64) -> Self {
        Self {
            prefix,
            ttl: Duration::from_secs(ttl_secs),
            key_builder: None,
        }
    }

    /// Replaces the default key derivation.
    #[must_use]
    pub fn with_key_builder<F>(mut self, key_builder: F) -> Self
    where
        F: Fn(&'static str, &Call) -> String + Send + Sync + 'static,
    {
        self.key_builder = Some(Arc::new(key_builder));
        self
    }

    /// The key a call is cached under.
    #[must_use]
    pub fn key_for(&self, call: &Call) -> String {
        match &self.key_builder {
            Some(builder) => builder(self.prefix, call),
            None => build_key(self.prefix, call),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Runs `f` through the cache.
    pub async fn run<T, E, F, Fut>(&self, cache: &CacheHandle, call: Call, f: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(backend) = cache.backend() else {
            return f().await;
        };

        let key = self.key_for(&call);

        match self.lookup::<T>(backend, &key).await {
            Ok(Some(value)) => {
                debug!(key = %key, "Cache hit");
                CacheMetrics::hit(self.prefix);
                return Ok(value);
            }
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                CacheMetrics::miss(self.prefix);
            }
            Err(e) => {
                warn!(key = %key, code = e.error_code(), error = %e, "Cache read failed, executing operation directly");
                CacheMetrics::error(self.prefix, "get");
            }
        }

        let result = f().await?;

        if let Err(e) = self.store(backend, &key, &result).await {
            warn!(key = %key, code = e.error_code(), error = %e, "Cache write failed");
            CacheMetrics::error(self.prefix, "set");
        }

        Ok(result)
    }

    async fn lookup<T: DeserializeOwned>(
        &self,
        backend: &dyn CacheBackend,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        match backend.get(key).await? {
            Some(text) if !text.is_empty() => codec::deserialize(&text).map(Some),
            _ => Ok(None),
        }
    }

    async fn store<T: Serialize>(
        &self,
        backend: &dyn CacheBackend,
        key: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        let text = codec::serialize(value)?;
        if text == codec::NULL {
            return Ok(());
        }
        backend.set_ex(key, &text, self.ttl).await
    }
}

impl std::fmt::Debug for ReadThrough {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadThrough")
            .field("prefix", &self.prefix)
            .field("ttl", &self.ttl)
            .field("custom_key", &self.key_builder.is_some())
            .finish()
    }
}
