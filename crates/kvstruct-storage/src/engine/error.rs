//! Storage error types.

use thiserror::Error;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be opened.
    #[error("failed to open database: {0}")]
    Open(String),

    /// A bucket does not exist.
    #[error("bucket not found: {}", .0.escape_ascii())]
    BucketNotFound(Vec<u8>),

    /// A bucket already exists.
    #[error("bucket already exists: {}", .0.escape_ascii())]
    BucketExists(Vec<u8>),

    /// A bucket's sequence counter cannot advance any further.
    #[error("sequence exhausted for bucket: {}", .0.escape_ascii())]
    SequenceOverflow(Vec<u8>),

    /// A transaction error occurred.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A write was attempted through a read-only transaction.
    #[error("transaction is read-only")]
    ReadOnly,

    /// The backend reported an unexpected failure.
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Returns `true` if this error reports a missing bucket.
    #[must_use]
    pub const fn is_bucket_not_found(&self) -> bool {
        matches!(self, Self::BucketNotFound(_))
    }
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
