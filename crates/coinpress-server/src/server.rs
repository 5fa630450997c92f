use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use coinpress_badges::{BadgeKeyspace, BadgeResolver};
use coinpress_cache_redis::create_kv_store;
use coinpress_db_postgres::{
    PgPool, PostgresContentStore, PostgresHoldingStore, create_pool, migrations, test_connection,
};
use coinpress_storage::{ContentStore, KeyValueStore};

use crate::{comments, config::AppConfig, dev, handlers, middleware as app_middleware};

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<BadgeResolver>,
    pub content: Arc<dyn ContentStore>,
    /// The same store the resolver reads; the flush endpoint needs it directly.
    pub cache: Arc<dyn KeyValueStore>,
    pub keyspace: BadgeKeyspace,
    /// Absent when running against in-memory stores in tests.
    pub pool: Option<PgPool>,
    pub config: Arc<AppConfig>,
}

pub struct CoinpressServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let request_timeout = state.config.request_timeout();
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/metrics", get(handlers::metrics))
        // Comment feed with badges
        .route(
            "/posts/{post_id}/comments",
            get(comments::get_post_comments),
        )
        // Development utilities
        .route(
            "/dev/flush-badge-cache",
            post(dev::flush_badge_cache_handler),
        )
        // Middleware stack (order: metrics -> cors -> compression -> trace -> timeout -> body limit)
        .layer(middleware::from_fn(app_middleware::track_metrics))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Connects the backing stores and assembles the router.
    ///
    /// Postgres must be reachable; Redis is optional and degrades to the
    /// always-miss cache when missing.
    pub async fn build(self) -> anyhow::Result<CoinpressServer> {
        let config = self.config;

        let pg = config
            .storage
            .postgres
            .clone()
            .ok_or_else(|| anyhow::anyhow!("storage.postgres config is required"))?;
        let pool = create_pool(&pg.pool_settings()).await?;
        if pg.run_migrations {
            migrations::run(&pool).await?;
        }
        test_connection(&pool).await?;

        let cache = create_kv_store(&config.redis).await;
        let keyspace = config.badges.keyspace();
        let holdings = Arc::new(PostgresHoldingStore::new(pool.clone()));
        let content: Arc<dyn ContentStore> = Arc::new(PostgresContentStore::new(pool.clone()));
        let resolver = Arc::new(
            BadgeResolver::new(cache.clone(), holdings)
                .with_keyspace(keyspace.clone())
                .with_ttl_policy(config.badges.ttl_policy()),
        );

        let state = AppState {
            resolver,
            content,
            cache,
            keyspace,
            pool: Some(pool),
            config: Arc::new(config),
        };

        Ok(CoinpressServer {
            addr: self.addr,
            app: build_app(state),
        })
    }
}

impl CoinpressServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
