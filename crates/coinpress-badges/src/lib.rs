//! Read-through badge resolution cache.
//!
//! Commenters on a post get a supporter badge when they hold the writer's
//! creator coin. Rendering a comment section means resolving badges for
//! hundreds of users at once, so lookups go through a cache with negative
//! caching in front of the holdings table:
//!
//! 1. every unique commenter is probed in the cache in parallel;
//! 2. misses are resolved with at most one batched holdings query;
//! 3. results (including "holds nothing" sentinels) are written back in
//!    parallel with jittered TTLs so a seeded batch doesn't expire at once.
//!
//! The cache is allowed to be absent or broken, in which case resolution
//! degrades to always-miss. A holdings query failure is fatal to the call.
//!
//! [`flush`] holds the companion invalidation utility that pages through the
//! badge keyspace and deletes it.

pub mod codec;
pub mod flush;
pub mod resolver;
pub mod ttl;

pub use codec::{BadgeCacheEntry, BadgeKeyspace, DecodeError, DEFAULT_KEY_PREFIX};
pub use flush::{flush_badge_cache, FlushError, DEFAULT_FLUSH_PAGE_SIZE};
pub use resolver::{BadgeResolution, BadgeResolver, CacheProbe, ResolutionError};
pub use ttl::TtlPolicy;
