//! The comment feed endpoint, decorated with supporter badges.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::warn;

use coinpress_core::{Badge, Comment};

use crate::error::ApiError;
use crate::server::AppState;

/// Client-facing tag for a failed badge resolution.
const BADGE_LOOKUP_FAILED: &str = "badge_lookup_failed";

#[derive(Debug, Default, Deserialize)]
pub struct CommentsQuery {
    /// Raw string on purpose: an unparsable limit falls back to the default
    /// instead of rejecting the whole request.
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
    /// Badges keyed by commenter user id; non-holders are absent.
    pub badges: HashMap<String, Badge>,
    #[serde(rename = "_devMetrics")]
    pub dev_metrics: DevMetrics,
}

/// Per-request diagnostics, returned inline for tuning in development.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevMetrics {
    pub comment_count: usize,
    pub unique_commenters: usize,
    pub badges_found: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub db_queries: u64,
    pub elapsed_ms: f64,
    /// `null` unless badge resolution failed.
    pub badge_error: Option<&'static str>,
}

/// `GET /posts/{post_id}/comments`
pub async fn get_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(query): Query<CommentsQuery>,
) -> Result<Json<CommentsResponse>, ApiError> {
    let limit = parse_limit(
        query.limit.as_deref(),
        state.config.server.default_comment_limit,
        state.config.server.max_comment_limit,
    );
    let response = build_comments_response(&state, &post_id, limit).await?;
    Ok(Json(response))
}

/// Lenient `limit` parsing: default when absent or unparsable, always
/// clamped to `1..=max`.
fn parse_limit(raw: Option<&str>, default: u32, max: u32) -> u32 {
    let requested = raw
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(i64::from(default));
    requested.clamp(1, i64::from(max)) as u32
}

async fn build_comments_response(
    state: &AppState,
    post_id: &str,
    limit: u32,
) -> Result<CommentsResponse, ApiError> {
    let start = Instant::now();

    let post = state.content.get_post(post_id).await.map_err(|err| {
        warn!(post_id, error = %err, "Failed to load post");
        ApiError::internal("failed to load comments")
    })?;
    let Some(post) = post else {
        return Err(ApiError::not_found("Post not found"));
    };

    let comments = state
        .content
        .list_comments(post_id, limit)
        .await
        .map_err(|err| {
            warn!(post_id, error = %err, "Failed to list comments");
            ApiError::internal("failed to load comments")
        })?;

    let commenter_ids: Vec<String> = comments.iter().map(|c| c.user.id.clone()).collect();
    let unique_commenters = commenter_ids.iter().collect::<HashSet<_>>().len();

    let mut badges: HashMap<String, Badge> = HashMap::new();
    let mut cache_hits = 0;
    let mut cache_misses = 0;
    let mut db_queries = 0;
    let mut badge_error = None;

    // Posts by writers without a coin have no badges to resolve.
    if let Some(coin_id) = post.coin_id.as_deref() {
        match state.resolver.resolve(coin_id, &commenter_ids).await {
            Ok(resolution) => {
                cache_hits = resolution.cache_hits;
                cache_misses = resolution.cache_misses;
                db_queries = resolution.db_queries;
                badges = resolution.badges;
            }
            Err(err) => {
                // Comments still go out; the feed is never held hostage by
                // the badge pipeline.
                warn!(post_id, coin_id, error = %err, "Badge resolution failed");
                badge_error = Some(BADGE_LOOKUP_FAILED);
            }
        }
    }

    crate::metrics::record_badge_lookup(cache_hits, cache_misses, db_queries);

    let elapsed_ms = round_to_hundredths(start.elapsed().as_secs_f64() * 1000.0);

    Ok(CommentsResponse {
        dev_metrics: DevMetrics {
            comment_count: comments.len(),
            unique_commenters,
            badges_found: badges.len(),
            cache_hits,
            cache_misses,
            db_queries,
            elapsed_ms,
            badge_error,
        },
        comments,
        badges,
    })
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use coinpress_badges::BadgeResolver;
    use coinpress_core::{BadgeTier, CommentAuthor, HoldingRecord, PostSummary};
    use coinpress_storage::{
        HoldingStore, MemoryContentStore, MemoryHoldingStore, MemoryKvStore, StorageError,
    };
    use std::sync::Arc;

    use crate::config::AppConfig;

    fn comment(id: &str, user_id: &str, minutes_ago: i64) -> Comment {
        Comment {
            id: id.to_string(),
            body: format!("comment {id}"),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            user: CommentAuthor {
                id: user_id.to_string(),
                display_name: format!("user {user_id}"),
                avatar_url: None,
            },
        }
    }

    fn holding(user_id: &str, balance: &str, tier: Option<BadgeTier>) -> HoldingRecord {
        HoldingRecord {
            user_id: user_id.to_string(),
            balance: balance.to_string(),
            tier,
            updated_at: Utc::now(),
        }
    }

    struct Fixture {
        state: AppState,
        content: Arc<MemoryContentStore>,
        holdings: Arc<MemoryHoldingStore>,
    }

    fn fixture() -> Fixture {
        let cache = Arc::new(MemoryKvStore::new());
        let holdings = Arc::new(MemoryHoldingStore::new());
        let content = Arc::new(MemoryContentStore::new());
        let resolver = Arc::new(BadgeResolver::new(cache.clone(), holdings.clone()));
        let state = AppState {
            resolver,
            content: content.clone(),
            cache,
            keyspace: Default::default(),
            pool: None,
            config: Arc::new(AppConfig::default()),
        };
        Fixture {
            state,
            content,
            holdings,
        }
    }

    fn seed_post(fixture: &Fixture, post_id: &str, coin_id: Option<&str>) {
        fixture.content.insert_post(PostSummary {
            id: post_id.to_string(),
            writer_id: "writer_1".to_string(),
            title: "Launch Notes".to_string(),
            coin_id: coin_id.map(str::to_string),
        });
    }

    #[tokio::test]
    async fn test_feed_with_badges() {
        let fx = fixture();
        seed_post(&fx, "post_1", Some("coin_1"));
        fx.content.insert_comment("post_1", comment("c1", "u1", 3));
        fx.content.insert_comment("post_1", comment("c2", "u2", 2));
        fx.content.insert_comment("post_1", comment("c3", "u1", 1));
        fx.holdings
            .insert("coin_1", holding("u1", "25000", Some(BadgeTier::Believer)));

        let response = build_comments_response(&fx.state, "post_1", 100)
            .await
            .unwrap();

        assert_eq!(response.comments.len(), 3);
        // Newest first.
        assert_eq!(response.comments[0].id, "c3");
        assert_eq!(response.badges.len(), 1);
        assert_eq!(response.badges["u1"].tier, Some(BadgeTier::Believer));

        let dm = &response.dev_metrics;
        assert_eq!(dm.comment_count, 3);
        assert_eq!(dm.unique_commenters, 2);
        assert_eq!(dm.badges_found, 1);
        assert_eq!(dm.cache_hits + dm.cache_misses, 2);
        assert_eq!(dm.db_queries, 1);
        assert_eq!(dm.badge_error, None);
    }

    #[tokio::test]
    async fn test_second_request_is_served_from_cache() {
        let fx = fixture();
        seed_post(&fx, "post_1", Some("coin_1"));
        fx.content.insert_comment("post_1", comment("c1", "u1", 1));
        fx.holdings
            .insert("coin_1", holding("u1", "9", Some(BadgeTier::Supporter)));

        build_comments_response(&fx.state, "post_1", 100)
            .await
            .unwrap();
        let second = build_comments_response(&fx.state, "post_1", 100)
            .await
            .unwrap();

        assert_eq!(second.dev_metrics.cache_hits, 1);
        assert_eq!(second.dev_metrics.cache_misses, 0);
        assert_eq!(second.dev_metrics.db_queries, 0);
        assert_eq!(fx.holdings.query_count(), 1);
    }

    #[tokio::test]
    async fn test_post_without_coin_has_no_badges() {
        let fx = fixture();
        seed_post(&fx, "post_1", None);
        fx.content.insert_comment("post_1", comment("c1", "u1", 1));

        let response = build_comments_response(&fx.state, "post_1", 100)
            .await
            .unwrap();

        assert!(response.badges.is_empty());
        assert_eq!(response.dev_metrics.cache_hits, 0);
        assert_eq!(response.dev_metrics.cache_misses, 0);
        assert_eq!(response.dev_metrics.db_queries, 0);
        assert_eq!(response.dev_metrics.badge_error, None);
    }

    #[tokio::test]
    async fn test_unknown_post_is_404() {
        let fx = fixture();
        let err = build_comments_response(&fx.state, "missing", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.to_string(), "Post not found");
    }

    struct FailingHoldingStore;

    #[async_trait]
    impl HoldingStore for FailingHoldingStore {
        async fn find_holdings(
            &self,
            _coin_id: &str,
            _user_ids: &[String],
        ) -> Result<Vec<HoldingRecord>, StorageError> {
            Err(StorageError::connection("db went away"))
        }
    }

    #[tokio::test]
    async fn test_badge_failure_degrades_the_feed() {
        let fx = fixture();
        seed_post(&fx, "post_1", Some("coin_1"));
        fx.content.insert_comment("post_1", comment("c1", "u1", 1));

        let state = AppState {
            resolver: Arc::new(BadgeResolver::new(
                Arc::new(MemoryKvStore::new()),
                Arc::new(FailingHoldingStore),
            )),
            ..fx.state
        };

        let response = build_comments_response(&state, "post_1", 100).await.unwrap();

        assert_eq!(response.comments.len(), 1);
        assert!(response.badges.is_empty());
        assert_eq!(response.dev_metrics.badge_error, Some("badge_lookup_failed"));
        assert_eq!(response.dev_metrics.badges_found, 0);
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None, 100, 500), 100);
        assert_eq!(parse_limit(Some("50"), 100, 500), 50);
        assert_eq!(parse_limit(Some(" 50 "), 100, 500), 50);
        assert_eq!(parse_limit(Some("definitely-not-a-number"), 100, 500), 100);
        assert_eq!(parse_limit(Some(""), 100, 500), 100);
        assert_eq!(parse_limit(Some("0"), 100, 500), 1);
        assert_eq!(parse_limit(Some("-3"), 100, 500), 1);
        assert_eq!(parse_limit(Some("9999"), 100, 500), 500);
    }

    #[test]
    fn test_response_wire_shape() {
        let response = CommentsResponse {
            comments: vec![],
            badges: HashMap::new(),
            dev_metrics: DevMetrics {
                comment_count: 0,
                unique_commenters: 0,
                badges_found: 0,
                cache_hits: 0,
                cache_misses: 0,
                db_queries: 0,
                elapsed_ms: 1.23,
                badge_error: None,
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        let dm = &value["_devMetrics"];
        assert_eq!(dm["commentCount"], 0);
        assert_eq!(dm["cacheHits"], 0);
        assert_eq!(dm["elapsedMs"], 1.23);
        // Present and null, not omitted.
        assert!(dm.get("badgeError").is_some());
        assert!(dm["badgeError"].is_null());
    }

    #[test]
    fn test_round_to_hundredths() {
        assert_eq!(round_to_hundredths(1.2345), 1.23);
        assert_eq!(round_to_hundredths(1.236), 1.24);
        assert_eq!(round_to_hundredths(0.0), 0.0);
    }
}
