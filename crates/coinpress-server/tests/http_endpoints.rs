//! Router-level tests for the HTTP surface, driven through `oneshot`
//! against in-memory stores.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use coinpress_badges::BadgeResolver;
use coinpress_core::{BadgeTier, Comment, CommentAuthor, HoldingRecord, PostSummary};
use coinpress_server::{AppConfig, AppState, Environment, build_app};
use coinpress_storage::{
    KeyValueStore, MemoryContentStore, MemoryHoldingStore, MemoryKvStore, UnconfiguredKvStore,
};

fn ts(minute: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 12, 10, minute, 0).unwrap()
}

fn make_state(
    cache: Arc<dyn KeyValueStore>,
    holdings: Arc<MemoryHoldingStore>,
    content: Arc<MemoryContentStore>,
    environment: Environment,
) -> AppState {
    let config = AppConfig {
        environment,
        ..AppConfig::default()
    };
    let keyspace = config.badges.keyspace();
    let resolver = Arc::new(
        BadgeResolver::new(cache.clone(), holdings).with_keyspace(keyspace.clone()),
    );
    AppState {
        resolver,
        content,
        cache,
        keyspace,
        pool: None,
        config: Arc::new(config),
    }
}

/// One post backed by a coin, two commenters, one of them a holder.
fn seeded_app(environment: Environment) -> Router {
    let cache: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let holdings = Arc::new(MemoryHoldingStore::new());
    holdings.insert(
        "coin_rae",
        HoldingRecord {
            user_id: "user_ana".to_string(),
            balance: "250000".to_string(),
            tier: Some(BadgeTier::Patron),
            updated_at: ts(0),
        },
    );

    let content = Arc::new(MemoryContentStore::new());
    content.insert_post(PostSummary {
        id: "post_field_notes".to_string(),
        writer_id: "user_rae".to_string(),
        title: "Field Notes".to_string(),
        coin_id: Some("coin_rae".to_string()),
    });
    content.insert_comment(
        "post_field_notes",
        Comment {
            id: "comment_1".to_string(),
            body: "great piece".to_string(),
            created_at: ts(1),
            user: CommentAuthor {
                id: "user_ana".to_string(),
                display_name: "Ana".to_string(),
                avatar_url: None,
            },
        },
    );
    content.insert_comment(
        "post_field_notes",
        Comment {
            id: "comment_2".to_string(),
            body: "following along".to_string(),
            created_at: ts(2),
            user: CommentAuthor {
                id: "user_bo".to_string(),
                display_name: "Bo".to_string(),
                avatar_url: None,
            },
        },
    );

    build_app(make_state(cache, holdings, content, environment))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = seeded_app(Environment::Development);

    let (status, body) = get_json(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "Coinpress Server");
    assert_eq!(body["status"], "ok");

    let (status, body) = get_json(app.clone(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    // No pool attached, so readiness has nothing to verify
    let (status, body) = get_json(app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn comment_feed_includes_badges() {
    let app = seeded_app(Environment::Development);

    let (status, body) = get_json(app, "/posts/post_field_notes/comments").await;
    assert_eq!(status, StatusCode::OK);

    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    // Newest first
    assert_eq!(comments[0]["id"], "comment_2");
    assert_eq!(comments[0]["user"]["displayName"], "Bo");
    assert_eq!(comments[1]["id"], "comment_1");

    assert_eq!(body["badges"]["user_ana"]["tier"], "patron");
    assert_eq!(body["badges"]["user_ana"]["balance"], "250000");
    assert!(body["badges"].get("user_bo").is_none());

    let metrics = &body["_devMetrics"];
    assert_eq!(metrics["commentCount"], 2);
    assert_eq!(metrics["uniqueCommenters"], 2);
    assert_eq!(metrics["badgesFound"], 1);
    assert_eq!(metrics["dbQueries"], 1);
    assert_eq!(
        metrics["cacheHits"].as_u64().unwrap() + metrics["cacheMisses"].as_u64().unwrap(),
        2
    );
    assert!(metrics["badgeError"].is_null());
}

#[tokio::test]
async fn comment_feed_second_request_served_from_cache() {
    let app = seeded_app(Environment::Development);

    let (status, _) = get_json(app.clone(), "/posts/post_field_notes/comments").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_json(app, "/posts/post_field_notes/comments").await;
    assert_eq!(status, StatusCode::OK);
    let metrics = &body["_devMetrics"];
    // Both the holder badge and the no-holding sentinel are warm now
    assert_eq!(metrics["cacheHits"], 2);
    assert_eq!(metrics["cacheMisses"], 0);
    assert_eq!(metrics["dbQueries"], 0);
    assert_eq!(body["badges"]["user_ana"]["tier"], "patron");
}

#[tokio::test]
async fn comment_feed_respects_limit() {
    let app = seeded_app(Environment::Development);

    let (status, body) = get_json(app.clone(), "/posts/post_field_notes/comments?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["id"], "comment_2");

    // Garbage limits fall back to the default instead of erroring
    let (status, body) = get_json(app, "/posts/post_field_notes/comments?limit=banana").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_post_is_not_found() {
    let app = seeded_app(Environment::Development);

    let (status, body) = get_json(app, "/posts/post_ghost/comments").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Post not found");
}

#[tokio::test]
async fn flush_is_forbidden_in_production() {
    let app = seeded_app(Environment::Production);

    let (status, body) = post_json(app, "/dev/flush-badge-cache").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not allowed in production");
}

#[tokio::test]
async fn flush_deletes_warm_badge_entries() {
    let app = seeded_app(Environment::Development);

    // Warm the cache: one badge entry plus one negative sentinel
    let (status, _) = get_json(app.clone(), "/posts/post_field_notes/comments").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(app.clone(), "/dev/flush-badge-cache").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);

    // Nothing left to delete
    let (status, body) = post_json(app, "/dev/flush-badge-cache").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 0);
}

#[tokio::test]
async fn flush_without_cache_backend_is_rejected() {
    let cache: Arc<dyn KeyValueStore> = Arc::new(UnconfiguredKvStore);
    let app = build_app(make_state(
        cache,
        Arc::new(MemoryHoldingStore::new()),
        Arc::new(MemoryContentStore::new()),
        Environment::Development,
    ));

    let (status, body) = post_json(app, "/dev/flush-badge-cache").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "redis not configured");
}

#[tokio::test]
async fn metrics_endpoint_renders_prometheus_text() {
    let app = seeded_app(Environment::Development);

    // Install the recorder, then drive one request through the middleware
    coinpress_server::init_metrics();
    let (status, _) = get_json(app.clone(), "/posts/post_field_notes/comments").await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
}
