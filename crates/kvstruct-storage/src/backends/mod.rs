//! Storage backend implementations.
//!
//! # Available Backends
//!
//! - [`redb`] - Pure-Rust embedded database with ACID transactions

pub mod redb;

pub use self::redb::{RedbConfig, RedbCursor, RedbEngine, RedbTransaction, DEFAULT_BATCH_SIZE};
