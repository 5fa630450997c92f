//! Capability traits for the storage abstraction layer.
//!
//! All traits are object-safe and `Send + Sync` so they can be shared as
//! `Arc<dyn …>` across the axum state and the resolver.

use async_trait::async_trait;
use std::time::Duration;

use coinpress_core::{Comment, HoldingRecord, PostSummary};

use crate::error::{CacheError, StorageError};
use crate::types::{ScanCursor, ScanPage};

/// Byte-oriented key-value cache with per-key TTLs.
///
/// Implementations must tolerate being absent: the unconfigured variant
/// ([`UnconfiguredKvStore`]) fails every call with
/// [`CacheError::NotConfigured`] so callers can degrade instead of special-
/// casing a missing cache handle.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. `Ok(None)` covers both absent and expired keys.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Upserts a value with a TTL.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Deletes a key. Idempotent; reports whether a key was actually removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Deletes a batch of keys, returning how many existed.
    async fn delete_many(&self, keys: &[String]) -> Result<u64, CacheError>;

    /// Returns one page of keys matching a glob pattern.
    ///
    /// Pages follow the SCAN contract described on [`ScanCursor`]: the
    /// backend chooses actual page sizes (`page_size` is a hint) and may
    /// return duplicate keys across pages. Callers that delete as they go
    /// are unaffected by either.
    async fn scan(
        &self,
        cursor: ScanCursor,
        pattern: &str,
        page_size: u32,
    ) -> Result<ScanPage, CacheError>;
}

/// The stand-in used when no cache backend is configured.
///
/// Every operation fails with [`CacheError::NotConfigured`] without doing any
/// I/O. Badge resolution treats that as a miss on every probe; the flush
/// utility surfaces it as a distinct error.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredKvStore;

#[async_trait]
impl KeyValueStore for UnconfiguredKvStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::NotConfigured)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::NotConfigured)
    }

    async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::NotConfigured)
    }

    async fn delete_many(&self, _keys: &[String]) -> Result<u64, CacheError> {
        Err(CacheError::NotConfigured)
    }

    async fn scan(
        &self,
        _cursor: ScanCursor,
        _pattern: &str,
        _page_size: u32,
    ) -> Result<ScanPage, CacheError> {
        Err(CacheError::NotConfigured)
    }
}

/// Batched lookups against the holdings table.
#[async_trait]
pub trait HoldingStore: Send + Sync {
    /// Finds the holdings of the given users for one coin.
    ///
    /// Returns one record per (coin, user) pair that exists; users without a
    /// holding are simply absent from the result. One call is one query
    /// regardless of how many users are asked for.
    async fn find_holdings(
        &self,
        coin_id: &str,
        user_ids: &[String],
    ) -> Result<Vec<HoldingRecord>, StorageError>;
}

/// Read access to posts and their comments.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Loads a post with its writer's coin id resolved.
    async fn get_post(&self, post_id: &str) -> Result<Option<PostSummary>, StorageError>;

    /// Lists a post's comments, newest first, with authors attached.
    async fn list_comments(&self, post_id: &str, limit: u32)
        -> Result<Vec<Comment>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_store_fails_everything() {
        let store = UnconfiguredKvStore;

        assert!(matches!(
            store.get("badge:c:u").await,
            Err(CacheError::NotConfigured)
        ));
        assert!(matches!(
            store
                .set("badge:c:u", b"{}".to_vec(), Duration::from_secs(60))
                .await,
            Err(CacheError::NotConfigured)
        ));
        assert!(matches!(
            store.delete("badge:c:u").await,
            Err(CacheError::NotConfigured)
        ));
        assert!(matches!(
            store.delete_many(&["badge:c:u".to_string()]).await,
            Err(CacheError::NotConfigured)
        ));
        assert!(matches!(
            store.scan(ScanCursor::START, "badge:*", 100).await,
            Err(CacheError::NotConfigured)
        ));
    }
}
