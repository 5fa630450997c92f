//! Paged deletion of every cached badge entry.

use tracing::info;

use coinpress_storage::{CacheError, KeyValueStore, ScanCursor};

use crate::codec::BadgeKeyspace;

/// Keys scanned per page. Matches the page size the dev endpoint always used.
pub const DEFAULT_FLUSH_PAGE_SIZE: u32 = 200;

/// Why a flush stopped early.
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    /// No cache is configured, so there is nothing to flush.
    #[error("badge cache is not configured")]
    NotConfigured,
    /// The cache failed mid-flush; `deleted` keys were already gone.
    #[error("badge cache flush interrupted after {deleted} deletions: {source}")]
    Interrupted {
        deleted: u64,
        #[source]
        source: CacheError,
    },
}

fn classify(deleted: u64, err: CacheError) -> FlushError {
    if err.is_not_configured() {
        FlushError::NotConfigured
    } else {
        FlushError::Interrupted {
            deleted,
            source: err,
        }
    }
}

/// Deletes every key under the badge keyspace and returns how many went.
///
/// Pages through the cursor-based scan so the key set never has to fit in
/// memory. Keys written concurrently with the flush may survive it; flushing
/// is a development convenience, not a consistency mechanism.
pub async fn flush_badge_cache(
    cache: &dyn KeyValueStore,
    keyspace: &BadgeKeyspace,
    page_size: u32,
) -> Result<u64, FlushError> {
    let pattern = keyspace.pattern();
    let mut cursor = ScanCursor::START;
    let mut deleted: u64 = 0;

    loop {
        let page = cache
            .scan(cursor, &pattern, page_size)
            .await
            .map_err(|err| classify(deleted, err))?;

        if !page.keys.is_empty() {
            deleted += cache
                .delete_many(&page.keys)
                .await
                .map_err(|err| classify(deleted, err))?;
        }

        match page.next_cursor {
            Some(next) => cursor = next,
            None => break,
        }
    }

    info!(deleted, pattern = %pattern, "flushed badge cache");
    Ok(deleted)
}
