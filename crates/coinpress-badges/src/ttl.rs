//! Jittered TTLs for cache writes.

use rand::Rng;
use std::time::Duration;

/// TTL policy: a base lifetime plus uniform random jitter.
///
/// Backfilling a cold comment section writes hundreds of entries in one
/// burst; without jitter they would all expire in the same instant and the
/// next page load would repeat the burst. Jitter is sampled per write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub base_secs: u64,
    pub stagger_secs: u64,
}

impl TtlPolicy {
    /// Default base lifetime of a badge entry.
    pub const DEFAULT_BASE_SECS: u64 = 600;

    /// Default jitter window added on top of the base.
    pub const DEFAULT_STAGGER_SECS: u64 = 120;

    #[must_use]
    pub fn new(base_secs: u64, stagger_secs: u64) -> Self {
        Self {
            base_secs,
            stagger_secs,
        }
    }

    /// Samples a TTL in `[base, base + stagger)`.
    #[must_use]
    pub fn sample(&self) -> Duration {
        let jitter = if self.stagger_secs == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..self.stagger_secs)
        };
        Duration::from_secs(self.base_secs + jitter)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_SECS, Self::DEFAULT_STAGGER_SECS)
    }
}
