//! Health, info, and metrics endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;

use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "Coinpress Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// Readiness: verifies the database when one is attached.
///
/// Cache trouble never makes the server unready; the badge path degrades to
/// always-miss on its own.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match state.pool {
        Some(ref pool) => match coinpress_db_postgres::test_connection(pool).await {
            Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ready" })),
            Err(err) => {
                tracing::warn!(error = %err, "Readiness check failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(HealthResponse { status: "degraded" }),
                )
            }
        },
        None => (StatusCode::OK, Json(HealthResponse { status: "ready" })),
    }
}

/// Prometheus metrics in text exposition format.
pub async fn metrics() -> impl IntoResponse {
    match crate::metrics::render_metrics() {
        Some(body) => (StatusCode::OK, body).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not initialized",
        )
            .into_response(),
    }
}
