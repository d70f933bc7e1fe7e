//! Redb storage backend.
//!
//! Buckets are emulated on top of two physical redb tables: a registry that
//! records which buckets exist together with their sequence counters, and a
//! data table holding the keys of every bucket under a length-prefixed bucket
//! name. See [`tables`] for the layout.
//!
//! # In-Memory Databases
//!
//! For testing, you can create an in-memory database that doesn't persist:
//!
//! ```ignore
//! let engine = RedbEngine::in_memory()?;
//! ```
//!
//! # Configuration
//!
//! ```ignore
//! use kvstruct_storage::backends::redb::{RedbConfig, RedbEngine};
//!
//! let config = RedbConfig::new().cache_size(64 * 1024 * 1024);
//! let engine = RedbEngine::open_with_config("my_database.redb", config)?;
//! ```

mod engine;
pub mod tables;
mod transaction;

pub use engine::{RedbConfig, RedbEngine};
pub use transaction::{RedbCursor, RedbTransaction, DEFAULT_BATCH_SIZE};
