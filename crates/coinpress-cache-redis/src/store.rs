//! `KeyValueStore` backed by a deadpool-managed Redis pool.

use async_trait::async_trait;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use std::time::Duration;

use coinpress_storage::{CacheError, KeyValueStore, ScanCursor, ScanPage};

/// Redis-backed key-value store.
///
/// Every failure maps to [`CacheError::Transport`]; callers decide whether
/// that degrades to a miss or aborts the operation.
pub struct RedisKvStore {
    pool: Pool,
}

impl RedisKvStore {
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|err| CacheError::transport(err.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|err| CacheError::transport(err.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        // SETEX rejects a zero expiry.
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|err| CacheError::transport(err.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn
            .del(key)
            .await
            .map_err(|err| CacheError::transport(err.to_string()))?;
        Ok(removed > 0)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection().await?;
        conn.del::<_, u64>(keys)
            .await
            .map_err(|err| CacheError::transport(err.to_string()))
    }

    async fn scan(
        &self,
        cursor: ScanCursor,
        pattern: &str,
        page_size: u32,
    ) -> Result<ScanPage, CacheError> {
        let mut conn = self.connection().await?;
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor.into_raw())
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(page_size)
            .query_async(&mut conn)
            .await
            .map_err(|err| CacheError::transport(err.to_string()))?;

        // Redis signals completion by returning cursor 0.
        Ok(ScanPage {
            next_cursor: (next != 0).then(|| ScanCursor::from_raw(next)),
            keys,
        })
    }
}
