//! Read-through caching and invalidation over a key-value backend.
//!
//! Services describe each invocation as a [`Call`] and route it through a
//! [`ReadThrough`] (fetches) or an [`Invalidate`] (mutations) together with
//! the [`CacheHandle`] they were built with:
//!
//! ```ignore
//! ReadThrough::new(PREFIX, 300)
//!     .run(&self.cache, Call::new("get_by_username").arg(username), || async {
//!         self.users.find_by_username(username).await
//!     })
//!     .await
//! ```
//!
//! Cache failures never reach the caller. Errors from the wrapped operation
//! pass through untouched.

mod backend;
pub mod codec;
mod error;
mod invalidate;
pub mod keys;
mod memory_backend;
pub mod metrics;
mod read_through;
mod redis_backend;

pub use backend::{CacheBackend, CacheHandle};
pub use error::{CacheError, CacheResult, CodecOperation};
pub use invalidate::{
    InvalidationKeys, InvalidationTarget, Invalidate, KeyResolver, DEFAULT_SCAN_BATCH_SIZE,
};
pub use keys::{build_key, Call, CallArgs, MAX_KEY_LENGTH};
pub use memory_backend::InMemoryCacheBackend;
pub use read_through::{KeyBuilder, ReadThrough};
pub use redis_backend::RedisCacheBackend;

/// Cache settings shared by all services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// `COUNT` hint for wildcard invalidation scans.
    pub scan_batch_size: u32,
    /// TTL in seconds for reads without a tuned lifetime of their own.
    pub default_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
            default_ttl_secs: 300,
        }
    }
}

impl From<&folio_config::RedisConfig> for CacheSettings {
    fn from(config: &folio_config::RedisConfig) -> Self {
        Self {
            scan_batch_size: config.scan_batch_size,
            default_ttl_secs: config.ttl.default_secs,
        }
    }
}
