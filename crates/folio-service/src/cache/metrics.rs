//! Prometheus metrics for the caching wrappers.

use metrics::{counter, describe_counter};

/// Metric names.
pub mod names {
    /// Reads answered from the cache.
    pub const CACHE_HITS_TOTAL: &str = "folio_cache_hits_total";
    /// Reads that fell through to the wrapped operation.
    pub const CACHE_MISSES_TOTAL: &str = "folio_cache_misses_total";
    /// Contained cache-layer failures.
    pub const CACHE_ERRORS_TOTAL: &str = "folio_cache_errors_total";
    /// Keys removed by invalidation.
    pub const CACHE_INVALIDATED_KEYS_TOTAL: &str = "folio_cache_invalidated_keys_total";
}

/// Registers metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::CACHE_HITS_TOTAL, "Total number of cache hits");
    describe_counter!(names::CACHE_MISSES_TOTAL, "Total number of cache misses");
    describe_counter!(
        names::CACHE_ERRORS_TOTAL,
        "Total number of cache errors absorbed by the caching layer"
    );
    describe_counter!(
        names::CACHE_INVALIDATED_KEYS_TOTAL,
        "Total number of cache keys deleted by invalidation"
    );
}

/// Cache metrics recorder.
#[derive(Clone, Copy)]
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn hit(prefix: &'static str) {
        counter!(names::CACHE_HITS_TOTAL, "prefix" => prefix).increment(1);
    }

    pub fn miss(prefix: &'static str) {
        counter!(names::CACHE_MISSES_TOTAL, "prefix" => prefix).increment(1);
    }

    /// `operation` is `get`, `set`, `invalidate`, ...
    pub fn error(prefix: &'static str, operation: &'static str) {
        counter!(
            names::CACHE_ERRORS_TOTAL,
            "prefix" => prefix,
            "operation" => operation
        )
        .increment(1);
    }

    pub fn invalidated(prefix: &'static str, count: u64) {
        if count > 0 {
            counter!(names::CACHE_INVALIDATED_KEYS_TOTAL, "prefix" => prefix).increment(count);
        }
    }
}
