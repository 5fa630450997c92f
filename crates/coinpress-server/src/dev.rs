//! Development-only endpoints.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::error;

use coinpress_badges::{FlushError, flush_badge_cache};

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct FlushResponse {
    pub deleted: u64,
}

/// `POST /dev/flush-badge-cache`
///
/// Wipes every cached badge entry so the next page load resolves fresh.
/// Refused in production unless `server.allow_dev_endpoints` opts in;
/// badge entries there age out via TTL.
pub async fn flush_badge_cache_handler(
    State(state): State<AppState>,
) -> Result<Json<FlushResponse>, ApiError> {
    if !state.config.dev_endpoints_enabled() {
        return Err(ApiError::forbidden("not allowed in production"));
    }

    match flush_badge_cache(
        state.cache.as_ref(),
        &state.keyspace,
        state.config.badges.flush_page_size,
    )
    .await
    {
        Ok(deleted) => Ok(Json(FlushResponse { deleted })),
        Err(FlushError::NotConfigured) => Err(ApiError::bad_request("redis not configured")),
        Err(err) => {
            error!(error = %err, "Badge cache flush failed");
            Err(ApiError::internal("failed to flush cache"))
        }
    }
}
