//! Redis backend for the badge cache.
//!
//! Connection handling degrades gracefully: when Redis is disabled or
//! unreachable at startup, callers get an [`UnconfiguredKvStore`] and the
//! application keeps running on the always-miss path.

pub mod config;
pub mod store;

pub use config::RedisConfig;
pub use store::RedisKvStore;

use std::sync::Arc;
use std::time::Duration;

use coinpress_storage::{KeyValueStore, UnconfiguredKvStore};

/// Create a key-value store from Redis configuration.
///
/// Connects and verifies the pool when Redis is enabled; any failure is
/// logged and answered with the unconfigured stub instead of an error.
pub async fn create_kv_store(config: &RedisConfig) -> Arc<dyn KeyValueStore> {
    if !config.enabled {
        tracing::info!("Redis disabled, badge cache will run in always-miss mode");
        return Arc::new(UnconfiguredKvStore);
    }

    tracing::info!(url = %config.url, "Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
    pool_config.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));
    redis_config.pool = Some(pool_config);

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to create Redis pool. Badge cache will run in always-miss mode."
            );
            return Arc::new(UnconfiguredKvStore);
        }
    };

    match pool.get().await {
        Ok(_) => {
            tracing::info!("✓ Connected to Redis successfully");
            Arc::new(RedisKvStore::new(pool))
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to connect to Redis. Badge cache will run in always-miss mode."
            );
            Arc::new(UnconfiguredKvStore)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_config_yields_unconfigured_store() {
        let store = create_kv_store(&RedisConfig::default()).await;
        let err = store.get("badge:c1:u1").await.unwrap_err();
        assert!(err.is_not_configured());
    }
}
