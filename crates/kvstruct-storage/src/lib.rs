//! `kvstruct` Storage
//!
//! This crate provides the ordered bucket store that the `kvstruct` data
//! structures are built on, plus its redb backend.
//!
//! # Overview
//!
//! The storage layer exposes named buckets, each an ordered map from byte-string
//! keys to byte-string values with its own sequence counter. All access goes
//! through a transaction, so changes that span several buckets commit or roll
//! back together.
//!
//! # Core Traits
//!
//! - [`StorageEngine`] - The main entry point for storage operations
//! - [`Transaction`] - Bucket management, point operations and sequences
//! - [`Cursor`] - Ordered, bidirectional iteration over a bucket
//!
//! # Error Handling
//!
//! All storage operations return [`StorageResult<T>`], which is an alias for
//! `Result<T, StorageError>`.
//!
//! # Example
//!
//! ```ignore
//! use kvstruct_storage::{StorageEngine, Transaction};
//! use kvstruct_storage::backends::RedbEngine;
//!
//! let engine = RedbEngine::open("my_database.redb")?;
//!
//! let mut tx = engine.begin_write()?;
//! tx.create_bucket_if_not_exists(b"users")?;
//! tx.put(b"users", b"user:1", b"Alice")?;
//! tx.commit()?;
//!
//! let tx = engine.begin_read()?;
//! assert_eq!(tx.get(b"users", b"user:1")?, Some(b"Alice".to_vec()));
//! ```

pub mod backends;
pub mod engine;

pub use engine::{
    Cursor, CursorResult, KeyValue, StorageEngine, StorageError, StorageResult, Transaction,
};
