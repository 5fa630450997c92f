//! Write-side helpers for the seeding CLI.
//!
//! Everything here is upsert-shaped so seeds can be re-run against a
//! database that already has data.

use chrono::{DateTime, Utc};
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::PgPool;

use coinpress_core::{BadgeTier, generate_id};

use crate::error::{PostgresError, Result};

/// One comment row ready for bulk insertion.
#[derive(Debug, Clone)]
pub struct CommentSeed {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Seeding operations over the content and holdings tables.
pub struct SeedStore {
    pool: PgPool,
}

impl SeedStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a user keyed by wallet address, returning the canonical id.
    ///
    /// Re-seeding an existing wallet updates the display name and returns
    /// the id the user already had.
    pub async fn upsert_user_by_wallet(
        &self,
        wallet_address: &str,
        display_name: &str,
    ) -> Result<String> {
        let id = generate_id("user");
        query_scalar(
            "INSERT INTO users (id, wallet_address, display_name) VALUES ($1, $2, $3) \
             ON CONFLICT (wallet_address) DO UPDATE SET display_name = EXCLUDED.display_name \
             RETURNING id",
        )
        .bind(&id)
        .bind(wallet_address)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(PostgresError::from)
    }

    /// Promotes a user to writer, returning the writer id.
    pub async fn upsert_writer(&self, user_id: &str, handle: &str) -> Result<String> {
        let id = generate_id("writer");
        query_scalar(
            "INSERT INTO writers (id, user_id, handle) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE SET handle = EXCLUDED.handle \
             RETURNING id",
        )
        .bind(&id)
        .bind(user_id)
        .bind(handle)
        .fetch_one(&self.pool)
        .await
        .map_err(PostgresError::from)
    }

    /// Creates or refreshes a post with a fixed id.
    pub async fn upsert_post(
        &self,
        id: &str,
        writer_id: &str,
        title: &str,
        body: &str,
    ) -> Result<String> {
        query_scalar(
            "INSERT INTO posts (id, writer_id, title, body, published_at) \
             VALUES ($1, $2, $3, $4, now()) \
             ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title, body = EXCLUDED.body \
             RETURNING id",
        )
        .bind(id)
        .bind(writer_id)
        .bind(title)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .map_err(PostgresError::from)
    }

    /// Creates the writer's coin, returning the id of whichever coin the
    /// writer ends up with (a writer has at most one).
    pub async fn upsert_coin(
        &self,
        id: &str,
        writer_id: &str,
        chain_id: i32,
        contract_address: &str,
        symbol: &str,
    ) -> Result<String> {
        query_scalar(
            "INSERT INTO writer_coins (id, writer_id, chain_id, contract_address, symbol) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (writer_id) DO UPDATE SET symbol = EXCLUDED.symbol \
             RETURNING id",
        )
        .bind(id)
        .bind(writer_id)
        .bind(chain_id)
        .bind(contract_address)
        .bind(symbol)
        .fetch_one(&self.pool)
        .await
        .map_err(PostgresError::from)
    }

    /// Writes one holding row; balance arrives as decimal text.
    pub async fn upsert_holding(
        &self,
        coin_id: &str,
        user_id: &str,
        balance: &str,
        tier: Option<BadgeTier>,
    ) -> Result<()> {
        query(
            "INSERT INTO writer_coin_holdings (writer_coin_id, user_id, balance, tier, updated_at) \
             VALUES ($1, $2, $3::numeric, $4, now()) \
             ON CONFLICT (writer_coin_id, user_id) DO UPDATE \
             SET balance = EXCLUDED.balance, tier = EXCLUDED.tier, updated_at = now()",
        )
        .bind(coin_id)
        .bind(user_id)
        .bind(balance)
        .bind(tier.map(|t| t.as_str()))
        .execute(&self.pool)
        .await
        .map_err(PostgresError::from)?;
        Ok(())
    }

    /// The coin attached to a post's writer, if the writer has launched one.
    pub async fn coin_for_post(&self, post_id: &str) -> Result<Option<String>> {
        query_scalar(
            "SELECT wc.id FROM posts p \
             JOIN writer_coins wc ON wc.writer_id = p.writer_id \
             WHERE p.id = $1",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(PostgresError::from)
    }

    /// Holder user ids for a coin, largest balances first.
    pub async fn list_holder_user_ids(&self, coin_id: &str) -> Result<Vec<String>> {
        query_scalar(
            "SELECT user_id FROM writer_coin_holdings \
             WHERE writer_coin_id = $1 AND balance > 0 \
             ORDER BY balance DESC",
        )
        .bind(coin_id)
        .fetch_all(&self.pool)
        .await
        .map_err(PostgresError::from)
    }

    /// Clears a post's comments ahead of a re-seed.
    pub async fn delete_comments_for_post(&self, post_id: &str) -> Result<u64> {
        let result = query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;
        Ok(result.rows_affected())
    }

    /// Bulk-inserts comments in one statement via UNNEST.
    pub async fn insert_comments(&self, rows: &[CommentSeed]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut ids = Vec::with_capacity(rows.len());
        let mut post_ids = Vec::with_capacity(rows.len());
        let mut user_ids = Vec::with_capacity(rows.len());
        let mut bodies = Vec::with_capacity(rows.len());
        let mut timestamps = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.id.clone());
            post_ids.push(row.post_id.clone());
            user_ids.push(row.user_id.clone());
            bodies.push(row.body.clone());
            timestamps.push(row.created_at);
        }

        let result = query(
            "INSERT INTO comments (id, post_id, user_id, body, created_at) \
             SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[], $5::timestamptz[])",
        )
        .bind(ids)
        .bind(post_ids)
        .bind(user_ids)
        .bind(bodies)
        .bind(timestamps)
        .execute(&self.pool)
        .await
        .map_err(PostgresError::from)?;

        Ok(result.rows_affected())
    }
}
