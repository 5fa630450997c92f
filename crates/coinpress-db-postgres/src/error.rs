//! Error types for the PostgreSQL storage backend.

use coinpress_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// Errors specific to the PostgreSQL storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database error from the driver.
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    /// Migration error (generic string for compatibility with different migration tools).
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

fn is_connection_error(err: &SqlxError) -> bool {
    matches!(
        err,
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) | SqlxError::Tls(_)
    )
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Database(e) => {
                if is_connection_error(&e) {
                    StorageError::connection(e.to_string())
                } else {
                    StorageError::query(e.to_string())
                }
            }
            PostgresError::Migration(e) => StorageError::internal(format!("Migration error: {e}")),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PostgresError::config("invalid URL");
        assert!(err.to_string().contains("Configuration error"));

        let err = PostgresError::Migration("checksum mismatch".into());
        assert!(err.to_string().contains("Migration error"));
    }

    #[test]
    fn test_conversion_to_storage_error() {
        let pg_err = PostgresError::config("test error");
        let storage_err: StorageError = pg_err.into();
        assert!(matches!(storage_err, StorageError::Internal { .. }));

        let pg_err = PostgresError::Database(SqlxError::PoolTimedOut);
        let storage_err: StorageError = pg_err.into();
        assert!(matches!(storage_err, StorageError::Connection { .. }));

        let pg_err = PostgresError::Database(SqlxError::RowNotFound);
        let storage_err: StorageError = pg_err.into();
        assert!(matches!(storage_err, StorageError::Query { .. }));
    }
}
