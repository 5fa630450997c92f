//! Error types for the storage abstraction layer.

/// Errors from the key-value cache capability.
///
/// Cache trouble is never fatal to badge resolution; callers map both
/// variants to a cache miss. The distinction matters to the flush utility,
/// which reports an unconfigured cache differently from a broken one.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No cache backend is configured. Operations fail immediately without
    /// any I/O.
    #[error("cache backend not configured")]
    NotConfigured,

    /// Connection or protocol failure talking to the backend.
    #[error("cache transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
}

impl CacheError {
    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Whether this is the unconfigured-cache case.
    #[must_use]
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }
}

/// Errors from the relational storage capabilities.
///
/// Unlike cache errors these are fatal to the operation that hit them: a
/// failed holdings query aborts the badge resolution.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// What kind of entity was looked up.
        entity: String,
        /// The id that missed.
        id: String,
    },

    /// Failed to connect to the storage backend.
    #[error("connection error: {message}")]
    Connection {
        /// Description of the connection failure.
        message: String,
    },

    /// A query failed to execute.
    #[error("query error: {message}")]
    Query {
        /// Description of the query failure.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("internal storage error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Query` error.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
