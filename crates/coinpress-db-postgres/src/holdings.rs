//! Creator-coin holdings lookups backing the badge resolver.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;

use coinpress_core::{BadgeTier, HoldingRecord};
use coinpress_storage::{HoldingStore, StorageError};

use crate::error::PostgresError;

/// Zero-balance rows are kept for audit history but are not holdings.
const FIND_HOLDINGS_SQL: &str = "\
SELECT user_id, balance::text AS balance, tier, updated_at
FROM writer_coin_holdings
WHERE writer_coin_id = $1 AND user_id = ANY($2) AND balance > 0";

/// `HoldingStore` backed by the `writer_coin_holdings` table.
pub struct PostgresHoldingStore {
    pool: PgPool,
}

impl PostgresHoldingStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HoldingStore for PostgresHoldingStore {
    async fn find_holdings(
        &self,
        coin_id: &str,
        user_ids: &[String],
    ) -> Result<Vec<HoldingRecord>, StorageError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(String, String, Option<String>, DateTime<Utc>)> =
            query_as(FIND_HOLDINGS_SQL)
                .bind(coin_id)
                .bind(user_ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::from(PostgresError::from(e)))?;

        Ok(rows
            .into_iter()
            .map(|(user_id, balance, tier, updated_at)| HoldingRecord {
                user_id,
                balance: normalize_numeric(&balance),
                tier: tier.and_then(|t| t.parse::<BadgeTier>().ok()),
                updated_at,
            })
            .collect())
    }
}

/// Trims the padding NUMERIC(38,18) adds: `150.000000000000000000` -> `150`.
fn normalize_numeric(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
