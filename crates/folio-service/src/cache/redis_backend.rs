//! Redis-backed cache.

use super::{CacheBackend, CacheError, CacheResult};
use async_trait::async_trait;
use deadpool_redis::{redis, redis::AsyncCommands, Config, Connection, Pool, Runtime};
use folio_config::RedisConfig;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Redis cache backend on a deadpool connection pool.
///
/// Every command, connection checkout included, is bounded by the configured
/// operation timeout.
pub struct RedisCacheBackend {
    pool: Pool,
    operation_timeout: Duration,
}

impl RedisCacheBackend {
    /// Builds the pool. No connection is opened until the first command.
    pub fn new(config: &RedisConfig) -> CacheResult<Self> {
        let mut redis_cfg = Config::from_url(&config.url);
        let pool_size = usize::try_from(config.pool_size).unwrap_or(usize::MAX);
        redis_cfg.pool = Some(deadpool_redis::PoolConfig::new(pool_size));

        let pool = redis_cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::unavailable(format!("Failed to create Redis pool: {}", e)))?;

        info!(pool_size, "Redis cache pool created");
        Ok(Self::with_pool(pool, config.operation_timeout()))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn with_pool(pool: Pool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> CacheResult<T>
    where
        F: Future<Output = CacheResult<T>> + Send,
    {
        tokio::time::timeout(self.operation_timeout, fut)
            .await
            .map_err(|_| {
                CacheError::unavailable(format!(
                    "Redis {} timed out after {}ms",
                    op,
                    self.operation_timeout.as_millis()
                ))
            })?
    }

    async fn conn(&self) -> CacheResult<Connection> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.bounded("GET", async {
            let mut conn = self.conn().await?;
            let value: Option<String> = conn.get(key).await?;
            Ok(value)
        })
        .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let ttl_secs = ttl.as_secs().max(1);
        self.bounded("SETEX", async {
            let mut conn = self.conn().await?;
            conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
            Ok(())
        })
        .await?;

        debug!(key = %key, ttl_secs, "Cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        self.bounded("DEL", async {
            let mut conn = self.conn().await?;
            let deleted: u64 = conn.del(key).await?;
            Ok(deleted)
        })
        .await
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: u32) -> CacheResult<(u64, Vec<String>)> {
        self.bounded("SCAN", async {
            let mut conn = self.conn().await?;
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(count)
                .query_async(&mut conn)
                .await?;
            Ok((next_cursor, keys))
        })
        .await
    }

    async fn ping(&self) -> CacheResult<()> {
        self.bounded("PING", async {
            let mut conn = self.conn().await?;
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok(())
        })
        .await
    }

    fn is_available(&self) -> bool {
        !self.pool.is_closed()
    }
}

impl std::fmt::Debug for RedisCacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisCacheBackend")
            .field("size", &status.size)
            .field("available", &status.available)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}
