//! Key-value backend abstraction and the handle services hold.

use super::CacheResult;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Key-value store the caching wrappers talk to.
///
/// Values are the codec's text form. Every call is one round-trip; the
/// implementation is responsible for bounding how long it may take.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Reads a value. `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Writes a value that expires after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Deletes a key and returns how many keys were removed.
    async fn delete(&self, key: &str) -> CacheResult<u64>;

    /// Runs one step of a cursor scan. A returned cursor of `0` ends the scan.
    async fn scan(&self, cursor: u64, pattern: &str, count: u32) -> CacheResult<(u64, Vec<String>)>;

    /// Round-trips to the backend.
    async fn ping(&self) -> CacheResult<()>;

    /// Whether the backend may currently be used at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// The cache as seen by a service.
#[derive(Clone, Default)]
pub enum CacheHandle {
    /// A live backend.
    Connected(Arc<dyn CacheBackend>),
    /// Caching is off; wrapped operations always run.
    #[default]
    Disabled,
}

impl CacheHandle {
    /// Wraps a backend.
    #[must_use]
    pub fn connected<B: CacheBackend + 'static>(backend: B) -> Self {
        Self::Connected(Arc::new(backend))
    }

    /// Returns the backend when it can be used.
    #[must_use]
    pub fn backend(&self) -> Option<&dyn CacheBackend> {
        match self {
            Self::Connected(backend) if backend.is_available() => Some(backend.as_ref()),
            _ => None,
        }
    }

    /// Whether caching is configured at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected(backend) => f
                .debug_struct("Connected")
                .field("available", &backend.is_available())
                .finish(),
            Self::Disabled => f.write_str("Disabled"),
        }
    }
}
