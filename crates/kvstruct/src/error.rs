//! Error types for `kvstruct`.
//!
//! This module provides the [`enum@Error`] type that represents all possible errors
//! when using the hash and sorted-index collections.

use kvstruct_core::CoreError;
use kvstruct_storage::StorageError;
use thiserror::Error;

/// Errors that can occur when using `kvstruct`.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Config(String),

    /// The database could not be opened.
    #[error("failed to open database: {0}")]
    Open(String),

    /// The named collection does not exist.
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    /// The key has no entry in an existing collection.
    #[error("key not found: {}", .0.escape_ascii())]
    KeyNotFound(Vec<u8>),

    /// A counter step would exceed the maximum value.
    #[error("overflow: {current} + {step} exceeds the maximum")]
    Overflow {
        /// The stored value.
        current: u64,
        /// The rejected step.
        step: i64,
    },

    /// A counter step would go below zero.
    #[error("underflow: {current} - {} is below zero", step.unsigned_abs())]
    Underflow {
        /// The stored value.
        current: u64,
        /// The rejected step.
        step: i64,
    },

    /// Stored or supplied bytes are not in the expected encoding.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(CoreError),

    /// The caller passed arguments that cannot be applied.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A storage error occurred.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns `true` if this error reports a missing collection or key.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BucketNotFound(_)
                | Self::KeyNotFound(_)
                | Self::Storage(StorageError::BucketNotFound(_))
        )
    }

    /// Returns `true` if this error reports a rejected counter step.
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        matches!(self, Self::Overflow { .. } | Self::Underflow { .. })
    }

    /// Returns `true` if this is a storage error.
    #[must_use]
    pub const fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Create a config error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Overflow { current, step } => Self::Overflow { current, step },
            CoreError::Underflow { current, step } => Self::Underflow { current, step },
            other => Self::MalformedEncoding(other),
        }
    }
}

/// A specialized `Result` type for `kvstruct` operations.
pub type Result<T> = std::result::Result<T, Error>;
