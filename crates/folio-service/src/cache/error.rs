//! Cache-layer failures.
//!
//! These never leave the read-through and invalidation wrappers; they are
//! logged and counted there. The [`FolioError`] conversion exists for callers
//! that talk to a backend directly, such as the readiness probe.

use folio_core::FolioError;
use std::fmt;
use thiserror::Error;

/// Direction of a failed codec operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOperation {
    Serialize,
    Deserialize,
}

impl CodecOperation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Serialize => "serialize",
            Self::Deserialize => "deserialize",
        }
    }
}

impl fmt::Display for CodecOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache error taxonomy.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Connection failure, pool exhaustion or timeout.
    #[error("Cache backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A value could not be converted to or from its stored form.
    #[error("Cache {operation} failed: {message}")]
    Serialization {
        operation: CodecOperation,
        message: String,
    },
}

impl CacheError {
    /// Creates a backend-unavailable error.
    #[must_use]
    pub fn unavailable<T: ToString>(message: T) -> Self {
        Self::BackendUnavailable(message.to_string())
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BackendUnavailable(_) => "CACHE_BACKEND_UNAVAILABLE",
            Self::Serialization { .. } => "CACHE_SERIALIZATION_ERROR",
        }
    }
}

impl From<deadpool_redis::redis::RedisError> for CacheError {
    fn from(err: deadpool_redis::redis::RedisError) -> Self {
        Self::BackendUnavailable(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for CacheError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::BackendUnavailable(format!("Failed to get Redis connection: {}", err))
    }
}

impl From<CacheError> for FolioError {
    fn from(err: CacheError) -> Self {
        Self::Cache {
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
