//! Storage engine traits and abstractions.
//!
//! This module defines the core traits that storage backends must implement:
//!
//! - [`StorageEngine`] - Main entry point for creating transactions
//! - [`Transaction`] - Bucket management, get/put/delete and sequence counters
//! - [`Cursor`] - Ordered, bidirectional iteration over one bucket
//!
//! # Error Handling
//!
//! All operations return [`StorageResult<T>`] which is an alias for
//! `Result<T, StorageError>`. See [`StorageError`] for the possible error variants.

mod error;
mod traits;

pub use error::{StorageError, StorageResult};
pub use traits::{Cursor, CursorResult, KeyValue, StorageEngine, Transaction};
