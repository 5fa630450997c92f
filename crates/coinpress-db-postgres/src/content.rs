//! Post and comment reads for the content API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;

use coinpress_core::{Comment, CommentAuthor, PostSummary};
use coinpress_storage::{ContentStore, StorageError};

use crate::error::PostgresError;

const GET_POST_SQL: &str = "\
SELECT p.id, p.writer_id, p.title, wc.id AS coin_id
FROM posts p
LEFT JOIN writer_coins wc ON wc.writer_id = p.writer_id
WHERE p.id = $1";

const LIST_COMMENTS_SQL: &str = "\
SELECT c.id, c.body, c.created_at, u.id AS user_id, u.display_name, u.avatar_url
FROM comments c
JOIN users u ON u.id = c.user_id
WHERE c.post_id = $1
ORDER BY c.created_at DESC
LIMIT $2";

/// `ContentStore` backed by the `posts` and `comments` tables.
pub struct PostgresContentStore {
    pool: PgPool,
}

impl PostgresContentStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PostgresContentStore {
    async fn get_post(&self, post_id: &str) -> Result<Option<PostSummary>, StorageError> {
        let row: Option<(String, String, String, Option<String>)> = query_as(GET_POST_SQL)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::from(PostgresError::from(e)))?;

        Ok(row.map(|(id, writer_id, title, coin_id)| PostSummary {
            id,
            writer_id,
            title,
            coin_id,
        }))
    }

    async fn list_comments(&self, post_id: &str, limit: u32) -> Result<Vec<Comment>, StorageError> {
        let rows: Vec<(String, String, DateTime<Utc>, String, String, Option<String>)> =
            query_as(LIST_COMMENTS_SQL)
                .bind(post_id)
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::from(PostgresError::from(e)))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, body, created_at, user_id, display_name, avatar_url)| Comment {
                    id,
                    body,
                    created_at,
                    user: CommentAuthor {
                        id: user_id,
                        display_name,
                        avatar_url,
                    },
                },
            )
            .collect())
    }
}
