//! Error types for the storage layer.

use memos_core::UnknownVariant;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Object store I/O error.
    #[error("object store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row held a value that does not map onto the entity.
    #[error("invalid row: {0}")]
    InvalidRow(#[from] UnknownVariant),

    #[error("user not found: {0}")]
    UserNotFound(i64),

    #[error("memo not found: {0}")]
    MemoNotFound(i64),

    #[error("tag not found: {0}")]
    TagNotFound(i64),

    #[error("resource not found: {0}")]
    ResourceNotFound(i64),

    /// Username already taken.
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// Object key rejected by the object store.
    #[error("invalid object key: {0}")]
    InvalidObjectKey(String),

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// Whether the error means the addressed row does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::MemoNotFound(_)
                | Self::TagNotFound(_)
                | Self::ResourceNotFound(_)
        )
    }
}
