//! Cache key construction and payload encoding for badge entries.
//!
//! Pure functions, no I/O. Both the resolver and the flush utility go through
//! [`BadgeKeyspace`] so key and pattern construction have a single authority.
//!
//! Payloads are JSON. A positive entry is the badge itself
//! (`{"tier":…,"balance":…,"updatedAt":…}`); a negative entry is the sentinel
//! `{"none":true}`, cached so that users who hold nothing don't trigger a
//! holdings query on every page load.

use serde_json::{json, Value};

use coinpress_core::Badge;

/// Default first segment of every badge cache key.
pub const DEFAULT_KEY_PREFIX: &str = "badge";

/// Field marking a payload as a negative sentinel.
const SENTINEL_FIELD: &str = "none";

/// Builds cache keys and scan patterns for one badge keyspace.
#[derive(Debug, Clone)]
pub struct BadgeKeyspace {
    prefix: String,
}

impl BadgeKeyspace {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The key for one (coin, user) pair: `{prefix}:{coin_id}:{user_id}`.
    ///
    /// Separators inside the ids are escaped so distinct pairs never share a
    /// key. Alphanumeric ids, the only kind the system generates, pass
    /// through unchanged.
    #[must_use]
    pub fn key(&self, coin_id: &str, user_id: &str) -> String {
        format!(
            "{}:{}:{}",
            self.prefix,
            escape_segment(coin_id),
            escape_segment(user_id)
        )
    }

    /// The glob pattern covering every key in this keyspace.
    #[must_use]
    pub fn pattern(&self) -> String {
        format!("{}:*", self.prefix)
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for BadgeKeyspace {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

/// Percent-escapes the key separator (and the escape character itself)
/// inside an id segment.
fn escape_segment(segment: &str) -> String {
    if !segment.contains([':', '%']) {
        return segment.to_string();
    }
    segment.replace('%', "%25").replace(':', "%3A")
}

/// A decoded cache payload.
#[derive(Debug, Clone, PartialEq)]
pub enum BadgeCacheEntry {
    /// The user holds the coin; here is their badge.
    Badge(Badge),
    /// The user is known to hold nothing. Cached as `{"none":true}`.
    Absent,
}

/// Error for payloads that decode as neither a badge nor a sentinel.
#[derive(Debug, thiserror::Error)]
#[error("invalid badge cache payload: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Encodes an entry to its JSON wire form.
pub fn encode_entry(entry: &BadgeCacheEntry) -> serde_json::Result<Vec<u8>> {
    match entry {
        BadgeCacheEntry::Badge(badge) => serde_json::to_vec(badge),
        BadgeCacheEntry::Absent => serde_json::to_vec(&json!({ SENTINEL_FIELD: true })),
    }
}

/// Decodes a cache payload.
///
/// Any payload carrying the sentinel field is a negative entry, whatever else
/// it contains; everything else must decode as a [`Badge`]. Callers treat a
/// `DecodeError` as a cache miss so a corrupt entry heals itself on the next
/// backfill.
pub fn decode_entry(bytes: &[u8]) -> Result<BadgeCacheEntry, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    if value.get(SENTINEL_FIELD).is_some() {
        return Ok(BadgeCacheEntry::Absent);
    }
    let badge: Badge = serde_json::from_value(value)?;
    Ok(BadgeCacheEntry::Badge(badge))
}
