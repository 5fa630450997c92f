//! The read-through badge resolver.

use futures::future::join_all;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use coinpress_core::{Badge, HoldingRecord};
use coinpress_storage::{CacheError, HoldingStore, KeyValueStore, StorageError};

use crate::codec::{decode_entry, encode_entry, BadgeCacheEntry, BadgeKeyspace};
use crate::ttl::TtlPolicy;

/// Outcome of probing the cache for one (coin, user) pair.
///
/// Three-way on purpose: a cached negative sentinel is knowledge ("this user
/// holds nothing"), not the absence of knowledge, and must never be conflated
/// with a plain miss.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheProbe {
    /// Cached badge for a holder.
    Hit(Badge),
    /// Cached sentinel: the user is known to hold nothing.
    KnownAbsent,
    /// Nothing cached, cache unavailable, or payload undecodable.
    Miss,
}

/// What a resolution produced, with its cache counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BadgeResolution {
    /// Badges keyed by user id. Absent users hold nothing.
    pub badges: HashMap<String, Badge>,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Holdings queries issued: 0 when every probe hit, otherwise 1.
    pub db_queries: u64,
}

/// Fatal resolution failures.
///
/// Cache trouble never lands here; only the relational store can abort a
/// resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// The batched holdings query failed.
    #[error("holdings lookup failed: {0}")]
    Holdings(#[from] StorageError),
}

/// Resolves supporter badges for batches of users via the cache.
///
/// Both stores are injected; tests run against the in-memory pair. Concurrent
/// resolutions of the same cold keys may each query and each backfill. Last
/// write wins; there is no per-key locking.
pub struct BadgeResolver {
    cache: Arc<dyn KeyValueStore>,
    holdings: Arc<dyn HoldingStore>,
    keyspace: BadgeKeyspace,
    ttl: TtlPolicy,
}

impl BadgeResolver {
    #[must_use]
    pub fn new(cache: Arc<dyn KeyValueStore>, holdings: Arc<dyn HoldingStore>) -> Self {
        Self {
            cache,
            holdings,
            keyspace: BadgeKeyspace::default(),
            ttl: TtlPolicy::default(),
        }
    }

    /// Sets the cache keyspace.
    #[must_use]
    pub fn with_keyspace(mut self, keyspace: BadgeKeyspace) -> Self {
        self.keyspace = keyspace;
        self
    }

    /// Sets the TTL policy for backfill writes.
    #[must_use]
    pub fn with_ttl_policy(mut self, ttl: TtlPolicy) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn keyspace(&self) -> &BadgeKeyspace {
        &self.keyspace
    }

    /// Resolves badges for `user_ids` against one coin.
    ///
    /// Input is deduplicated preserving first-occurrence order; an empty
    /// input returns immediately without touching either store. Always:
    /// `cache_hits + cache_misses` equals the number of unique users, and
    /// `db_queries` is 0 or 1.
    pub async fn resolve(
        &self,
        coin_id: &str,
        user_ids: &[String],
    ) -> Result<BadgeResolution, ResolutionError> {
        let unique: IndexSet<&str> = user_ids.iter().map(String::as_str).collect();

        let mut result = BadgeResolution::default();
        if unique.is_empty() {
            return Ok(result);
        }

        let probes = join_all(unique.iter().map(|uid| self.probe(coin_id, uid))).await;

        let mut missed: Vec<&str> = Vec::new();
        for (uid, probe) in unique.iter().zip(probes) {
            match probe {
                CacheProbe::Hit(badge) => {
                    result.cache_hits += 1;
                    result.badges.insert((*uid).to_string(), badge);
                }
                CacheProbe::KnownAbsent => {
                    result.cache_hits += 1;
                }
                CacheProbe::Miss => {
                    result.cache_misses += 1;
                    missed.push(uid);
                }
            }
        }

        if missed.is_empty() {
            return Ok(result);
        }

        result.db_queries = 1;
        let missed_ids: Vec<String> = missed.iter().map(|uid| (*uid).to_string()).collect();
        let holdings = self.holdings.find_holdings(coin_id, &missed_ids).await?;
        let by_user: HashMap<&str, &HoldingRecord> = holdings
            .iter()
            .map(|holding| (holding.user_id.as_str(), holding))
            .collect();

        let backfilled = join_all(missed.iter().map(|uid| {
            let holding = by_user.get(uid).copied();
            self.backfill(coin_id, uid, holding)
        }))
        .await;

        for (uid, badge) in missed.iter().zip(backfilled) {
            if let Some(badge) = badge {
                result.badges.insert((*uid).to_string(), badge);
            }
        }

        Ok(result)
    }

    /// Probes the cache for one user. Infallible: every failure mode is a
    /// miss, because the holdings table can answer whatever the cache can't.
    async fn probe(&self, coin_id: &str, user_id: &str) -> CacheProbe {
        let key = self.keyspace.key(coin_id, user_id);

        let bytes = match self.cache.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return CacheProbe::Miss,
            Err(CacheError::NotConfigured) => return CacheProbe::Miss,
            Err(err) => {
                warn!(key = %key, error = %err, "badge cache read failed");
                return CacheProbe::Miss;
            }
        };

        match decode_entry(&bytes) {
            Ok(BadgeCacheEntry::Badge(badge)) => {
                debug!(key = %key, "badge cache hit");
                CacheProbe::Hit(badge)
            }
            Ok(BadgeCacheEntry::Absent) => {
                debug!(key = %key, "badge cache hit (known absent)");
                CacheProbe::KnownAbsent
            }
            Err(err) => {
                warn!(key = %key, error = %err, "undecodable badge cache entry, treating as miss");
                CacheProbe::Miss
            }
        }
    }

    /// Writes the post-query state of one user back to the cache and returns
    /// their badge, if any. Write failures are logged and swallowed; they
    /// cost a future cache miss, nothing more.
    async fn backfill(
        &self,
        coin_id: &str,
        user_id: &str,
        holding: Option<&HoldingRecord>,
    ) -> Option<Badge> {
        let key = self.keyspace.key(coin_id, user_id);
        let (entry, badge) = match holding {
            Some(holding) => {
                let badge = holding.badge();
                (BadgeCacheEntry::Badge(badge.clone()), Some(badge))
            }
            None => (BadgeCacheEntry::Absent, None),
        };

        match encode_entry(&entry) {
            Ok(bytes) => {
                if let Err(err) = self.cache.set(&key, bytes, self.ttl.sample()).await {
                    if !err.is_not_configured() {
                        warn!(key = %key, error = %err, "badge cache write failed");
                    }
                }
            }
            Err(err) => {
                warn!(key = %key, error = %err, "failed to encode badge cache entry");
            }
        }

        badge
    }
}
