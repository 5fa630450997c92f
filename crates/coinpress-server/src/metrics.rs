//! Prometheus metrics for the Coinpress server.
//!
//! This module provides:
//! - HTTP request metrics (count, latency)
//! - Badge cache metrics (hits, misses, holdings queries)

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

    // Badge cache metrics
    pub const BADGE_CACHE_HITS_TOTAL: &str = "badge_cache_hits_total";
    pub const BADGE_CACHE_MISSES_TOTAL: &str = "badge_cache_misses_total";
    pub const BADGE_DB_QUERIES_TOTAL: &str = "badge_db_queries_total";
}

/// Initialize the Prometheus metrics exporter.
///
/// This should be called once at server startup.
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        tracing::debug!("Prometheus metrics already initialized");
        return false;
    }

    // Use install_recorder() for pull-based metrics (we serve /metrics ourselves)
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROMETHEUS_HANDLE.set(handle).is_err() {
                tracing::warn!("Failed to store Prometheus handle (already set)");
                return false;
            }

            tracing::info!("Prometheus metrics initialized");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
            false
        }
    }
}

/// Render all metrics in Prometheus text format.
///
/// Returns `None` if metrics were not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render())
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let status_class = match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };

    // Normalize path to avoid high cardinality
    let normalized_path = normalize_path(path);

    counter!(
        names::HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => normalized_path.clone(),
        "status" => status.to_string(),
        "status_class" => status_class.to_string()
    )
    .increment(1);

    histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "path" => normalized_path
    )
    .record(duration.as_secs_f64());
}

/// Record the cache counters of one badge resolution.
pub fn record_badge_lookup(cache_hits: u64, cache_misses: u64, db_queries: u64) {
    counter!(names::BADGE_CACHE_HITS_TOTAL).increment(cache_hits);
    counter!(names::BADGE_CACHE_MISSES_TOTAL).increment(cache_misses);
    counter!(names::BADGE_DB_QUERIES_TOTAL).increment(db_queries);
}

/// Normalize a path to reduce cardinality.
///
/// Post ids are caller-supplied and unbounded, so `/posts/{post_id}/comments`
/// must not fan out into one label value per post.
fn normalize_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    let mut normalized = Vec::with_capacity(parts.len());

    for (i, part) in parts.iter().enumerate() {
        let follows_posts = i > 0 && parts[i - 1] == "posts";
        if follows_posts && !part.is_empty() {
            normalized.push("{post_id}");
        } else {
            normalized.push(part);
        }
    }

    normalized.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_replaces_post_ids() {
        assert_eq!(
            normalize_path("/posts/post_8f3a2c/comments"),
            "/posts/{post_id}/comments"
        );
        assert_eq!(normalize_path("/posts/123"), "/posts/{post_id}");
    }

    #[test]
    fn test_normalize_path_keeps_static_routes() {
        assert_eq!(normalize_path("/healthz"), "/healthz");
        assert_eq!(
            normalize_path("/dev/flush-badge-cache"),
            "/dev/flush-badge-cache"
        );
        assert_eq!(normalize_path("/posts/"), "/posts/");
    }
}
