//! Invalidation after mutating operations.

use super::keys::{build_key, qualify, Call, CallArgs};
use super::metrics::CacheMetrics;
use super::{CacheBackend, CacheError, CacheHandle, CacheResult, CodecOperation};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default `COUNT` hint for wildcard scans.
pub const DEFAULT_SCAN_BATCH_SIZE: u32 = 100;

/// Keys produced by a resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationKeys {
    One(String),
    Many(Vec<String>),
}

impl InvalidationKeys {
    /// Flattens to a list.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(key) => vec![key],
            Self::Many(keys) => keys,
        }
    }
}

impl From<String> for InvalidationKeys {
    fn from(key: String) -> Self {
        Self::One(key)
    }
}

impl From<Vec<String>> for InvalidationKeys {
    fn from(keys: Vec<String>) -> Self {
        Self::Many(keys)
    }
}

/// Derives fully qualified keys from the call arguments and the mutation
/// result (as JSON).
pub type KeyResolver = Arc<dyn Fn(&CallArgs, &serde_json::Value) -> InvalidationKeys + Send + Sync>;

/// What an [`Invalidate`] removes.
#[derive(Clone)]
pub enum InvalidationTarget {
    /// The key a read-through on the same operation and arguments would use.
    Operation,
    /// `prefix:key`.
    Key(String),
    /// Every key matching `prefix:pattern`, found by cursor scan.
    Pattern(String),
    /// Whatever the resolver returns, used verbatim.
    Resolver(KeyResolver),
}

impl std::fmt::Debug for InvalidationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Operation => f.write_str("Operation"),
            Self::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
            Self::Resolver(_) => f.write_str("Resolver"),
        }
    }
}

/// Invalidation wrapper for one mutating operation.
///
/// The operation always runs first. Invalidation happens only after it
/// succeeds, and any failure while invalidating is logged and dropped: the
/// caller always gets exactly what the operation returned.
#[derive(Debug, Clone)]
pub struct Invalidate {
    prefix: &'static str,
    target: InvalidationTarget,
    scan_batch_size: u32,
}

impl Invalidate {
    /// Invalidates the operation's own key.
    #[must_use]
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            target: InvalidationTarget::Operation,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }

    /// Invalidates `prefix:pattern`. A pattern containing `*` is scanned for;
    /// anything else is deleted as a single key.
    #[must_use]
    pub fn pattern(prefix: &'static str, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let target = if pattern.contains('*') {
            InvalidationTarget::Pattern(pattern)
        } else {
            InvalidationTarget::Key(pattern)
        };
        Self {
            target,
            ..Self::new(prefix)
        }
    }

    /// Invalidates the keys a resolver derives.
    #[must_use]
    pub fn resolver<F>(prefix: &'static str, resolver: F) -> Self
    where
        F: Fn(&CallArgs, &serde_json::Value) -> InvalidationKeys + Send + Sync + 'static,
    {
        Self {
            target: InvalidationTarget::Resolver(Arc::new(resolver)),
            ..Self::new(prefix)
        }
    }

    /// Sets the `COUNT` hint used while scanning.
    #[must_use]
    pub fn with_scan_batch_size(mut self, scan_batch_size: u32) -> Self {
        self.scan_batch_size = scan_batch_size.max(1);
        self
    }

    #[must_use]
    pub const fn target(&self) -> &InvalidationTarget {
        &self.target
    }

    /// Runs `f`, then invalidates.
    pub async fn run<T, E, F, Fut>(&self, cache: &CacheHandle, call: Call, f: F) -> Result<T, E>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let result = f().await?;

        let Some(backend) = cache.backend() else {
            return Ok(result);
        };

        match self.invalidate(backend, &call, &result).await {
            Ok(deleted) => {
                debug!(
                    prefix = self.prefix,
                    operation = call.operation(),
                    deleted,
                    "Cache invalidated"
                );
                CacheMetrics::invalidated(self.prefix, deleted);
            }
            Err(e) => {
                warn!(
                    prefix = self.prefix,
                    operation = call.operation(),
                    code = e.error_code(),
                    error = %e,
                    "Error invalidating cache"
                );
                CacheMetrics::error(self.prefix, "invalidate");
            }
        }

        Ok(result)
    }

    async fn invalidate<T: Serialize>(
        &self,
        backend: &dyn CacheBackend,
        call: &Call,
        result: &T,
    ) -> CacheResult<u64> {
        match &self.target {
            InvalidationTarget::Resolver(resolver) => {
                let value = serde_json::to_value(result).map_err(|e| CacheError::Serialization {
                    operation: CodecOperation::Serialize,
                    message: e.to_string(),
                })?;
                let mut deleted = 0;
                for key in resolver(call.args(), &value).into_vec() {
                    deleted += delete_key(backend, &key).await?;
                }
                Ok(deleted)
            }
            InvalidationTarget::Pattern(pattern) => {
                scan_delete(backend, &qualify(self.prefix, pattern), self.scan_batch_size).await
            }
            InvalidationTarget::Key(key) => delete_key(backend, &qualify(self.prefix, key)).await,
            InvalidationTarget::Operation => delete_key(backend, &build_key(self.prefix, call)).await,
        }
    }
}

async fn delete_key(backend: &dyn CacheBackend, key: &str) -> CacheResult<u64> {
    let deleted = backend.delete(key).await?;
    debug!(key = %key, "Invalidated cache key");
    Ok(deleted)
}

/// Deletes every key matching `pattern`, one scan batch at a time, until the
/// cursor comes back to zero.
async fn scan_delete(backend: &dyn CacheBackend, pattern: &str, batch_size: u32) -> CacheResult<u64> {
    let mut cursor: u64 = 0;
    let mut total_deleted = 0;

    loop {
        let (next_cursor, keys) = backend.scan(cursor, pattern, batch_size).await?;

        for key in &keys {
            total_deleted += delete_key(backend, key).await?;
        }

        cursor = next_cursor;
        if cursor == 0 {
            break;
        }
    }

    Ok(total_deleted)
}
