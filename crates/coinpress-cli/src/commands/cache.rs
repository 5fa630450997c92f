//! Badge cache maintenance.

use anyhow::Result;

use coinpress_badges::{FlushError, flush_badge_cache};
use coinpress_cache_redis::create_kv_store;
use coinpress_server::AppConfig;

use crate::output::print_success;

/// Deletes every cached badge entry, paging through the keyspace.
pub async fn flush(config: &AppConfig) -> Result<()> {
    let cache = create_kv_store(&config.redis).await;
    let keyspace = config.badges.keyspace();

    match flush_badge_cache(cache.as_ref(), &keyspace, config.badges.flush_page_size).await {
        Ok(deleted) => {
            print_success(&format!("Flushed {deleted} badge entries"));
            Ok(())
        }
        Err(FlushError::NotConfigured) => {
            anyhow::bail!("redis not configured (set redis.enabled = true and redis.url)")
        }
        Err(err) => Err(err.into()),
    }
}
