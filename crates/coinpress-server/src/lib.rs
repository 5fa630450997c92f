pub mod comments;
pub mod config;
pub mod dev;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::{
    AppConfig, BadgeSettings, Environment, LoggingConfig, PostgresStorageConfig, ServerConfig,
    StorageConfig,
};
pub use error::ApiError;
pub use metrics::{init_metrics, render_metrics};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{AppState, CoinpressServer, ServerBuilder, build_app};
