//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur while encoding or decoding keys and counters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A base-254 digit was one of the reserved bytes `0x00` or `0x01`.
    #[error("malformed base-254 encoding: reserved byte 0x{byte:02x} at offset {offset}")]
    MalformedEncoding {
        /// Offset of the offending byte in the encoded input.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },

    /// A stored score was not exactly eight bytes wide.
    #[error("invalid score width: expected {expected} bytes, got {actual}")]
    InvalidScore {
        /// Required width.
        expected: usize,
        /// Width that was found.
        actual: usize,
    },

    /// A composite index key was shorter than its score prefix.
    #[error("index key too short: {0} bytes")]
    TruncatedIndexKey(usize),

    /// Adding a positive step would exceed the maximum score.
    #[error("overflow: {current} + {step} exceeds the maximum score")]
    Overflow {
        /// Value before the step was applied.
        current: u64,
        /// The step that was rejected.
        step: i64,
    },

    /// Subtracting a negative step would drop below the minimum score.
    #[error("underflow: {current} - {} is below the minimum score", step.unsigned_abs())]
    Underflow {
        /// Value before the step was applied.
        current: u64,
        /// The step that was rejected.
        step: i64,
    },
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
