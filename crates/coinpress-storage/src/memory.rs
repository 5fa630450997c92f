//! In-memory implementations of the storage capabilities.
//!
//! Used by unit tests throughout the workspace and usable for local
//! development. [`MemoryKvStore`] honors TTLs, glob patterns, and the paged
//! scan contract so flush and resolver behavior can be exercised without a
//! Redis; the holding and content stores are plain maps with insert helpers.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use coinpress_core::{Comment, HoldingRecord, PostSummary};

use crate::error::{CacheError, StorageError};
use crate::traits::{ContentStore, HoldingStore, KeyValueStore};
use crate::types::{ScanCursor, ScanPage};

/// A cached value with its expiry instant.
#[derive(Debug, Clone)]
struct MemoryEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl MemoryEntry {
    fn new(value: Vec<u8>, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Operation counts for a [`MemoryKvStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryKvStats {
    pub gets: u64,
    pub sets: u64,
    pub deletes: u64,
    pub scans: u64,
}

/// TTL-honoring in-memory key-value store.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, MemoryEntry>,
    /// Live scan positions: cursor id -> last key handed out. Consumed on use.
    scan_positions: DashMap<u64, String>,
    next_scan_cursor: AtomicU64,
    gets: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    scans: AtomicU64,
}

impl MemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of per-operation call counts.
    #[must_use]
    pub fn stats(&self) -> MemoryKvStats {
        MemoryKvStats {
            gets: self.gets.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            scans: self.scans.load(Ordering::Relaxed),
        }
    }

    /// Live keys matching a pattern, sorted, as one stable snapshot.
    fn matching_keys(&self, pattern: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_expired())
            .filter(|entry| glob_match(pattern, entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.gets.fetch_add(1, Ordering::Relaxed);

        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::Relaxed);
        self.entries
            .insert(key.to_string(), MemoryEntry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        Ok(self.entries.remove(key).is_some())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<u64, CacheError> {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        let mut removed = 0;
        for key in keys {
            if self.entries.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn scan(
        &self,
        cursor: ScanCursor,
        pattern: &str,
        page_size: u32,
    ) -> Result<ScanPage, CacheError> {
        self.scans.fetch_add(1, Ordering::Relaxed);

        // A continuation cursor resumes after the last key it handed out, so
        // keys deleted between pages never cause matches to be skipped. Keys
        // written mid-scan may or may not be seen, same as the SCAN contract
        // this mimics.
        let after = if cursor == ScanCursor::START {
            None
        } else {
            match self.scan_positions.remove(&cursor.into_raw()) {
                Some((_, key)) => Some(key),
                // Stale or foreign cursor: nothing left to iterate.
                None => return Ok(ScanPage::empty()),
            }
        };

        let keys = self.matching_keys(pattern);
        let start = match after {
            Some(last) => keys.partition_point(|key| *key <= last),
            None => 0,
        };
        let page_size = (page_size as usize).max(1);
        let end = (start + page_size).min(keys.len());
        let page_keys = keys[start..end].to_vec();

        let next_cursor = if end >= keys.len() {
            None
        } else {
            let id = self.next_scan_cursor.fetch_add(1, Ordering::Relaxed) + 1;
            self.scan_positions.insert(id, keys[end - 1].clone());
            Some(ScanCursor::from_raw(id))
        };

        Ok(ScanPage {
            next_cursor,
            keys: page_keys,
        })
    }
}

/// Matches a key against a glob pattern supporting `*` only.
fn glob_match(pattern: &str, key: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return pattern == key;
    }

    let mut rest = key;
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(segment) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == last {
            return rest.ends_with(segment);
        } else {
            match rest.find(segment) {
                Some(pos) => rest = &rest[pos + segment.len()..],
                None => return false,
            }
        }
    }
    true
}

/// In-memory holdings table keyed by (coin, user).
#[derive(Default)]
pub struct MemoryHoldingStore {
    holdings: DashMap<(String, String), HoldingRecord>,
    queries: AtomicU64,
}

impl MemoryHoldingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a holding.
    pub fn insert(&self, coin_id: &str, record: HoldingRecord) {
        self.holdings
            .insert((coin_id.to_string(), record.user_id.clone()), record);
    }

    /// How many `find_holdings` calls this store has served.
    #[must_use]
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl HoldingStore for MemoryHoldingStore {
    async fn find_holdings(
        &self,
        coin_id: &str,
        user_ids: &[String],
    ) -> Result<Vec<HoldingRecord>, StorageError> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        Ok(user_ids
            .iter()
            .filter_map(|user_id| {
                self.holdings
                    .get(&(coin_id.to_string(), user_id.clone()))
                    .map(|entry| entry.value().clone())
            })
            .collect())
    }
}

/// In-memory posts and comments.
#[derive(Default)]
pub struct MemoryContentStore {
    posts: DashMap<String, PostSummary>,
    comments: DashMap<String, Vec<Comment>>,
}

impl MemoryContentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_post(&self, post: PostSummary) {
        self.posts.insert(post.id.clone(), post);
    }

    pub fn insert_comment(&self, post_id: &str, comment: Comment) {
        self.comments
            .entry(post_id.to_string())
            .or_default()
            .push(comment);
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn get_post(&self, post_id: &str) -> Result<Option<PostSummary>, StorageError> {
        Ok(self.posts.get(post_id).map(|entry| entry.value().clone()))
    }

    async fn list_comments(
        &self,
        post_id: &str,
        limit: u32,
    ) -> Result<Vec<Comment>, StorageError> {
        let mut comments = self
            .comments
            .get(post_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        comments.truncate(limit as usize);
        Ok(comments)
    }
}
