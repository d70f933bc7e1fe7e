//! `kvstruct` - Hash Tables and Sorted Indexes on an Embedded Store
//!
//! `kvstruct` layers two collection types over a transactional, ordered
//! bucket store:
//!
//! - **Hash collections** ([`HashBucket`]): named key-value tables with
//!   counters, batch operations and key-ordered scans
//! - **Sorted indexes** ([`SortedIndex`]): named member-to-score maps that
//!   can be scanned in score order, backed by a derived index that is kept
//!   consistent inside every transaction
//!
//! # Quick Start
//!
//! ```
//! use kvstruct::{Database, TransactionExt};
//!
//! # fn main() -> kvstruct::Result<()> {
//! let db = Database::in_memory()?;
//!
//! db.update(|tx| {
//!     let mut sorted = tx.sorted();
//!     sorted.set("s", b"a", 10)?;
//!     sorted.set("s", b"b", 5)?;
//!     sorted.set("s", b"a", 20)?;
//!     Ok(())
//! })?;
//!
//! let members = db.view(|tx| tx.sorted().scan_forward("s", 10))?;
//! assert_eq!(members, vec![(b"b".to_vec(), 5), (b"a".to_vec(), 20)]);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`database`] - the [`Database`] handle and transaction helpers
//! - [`config`] - [`Config`] and [`DatabaseBuilder`]
//! - [`hash`] - hash collections
//! - [`sorted`] - sorted indexes
//! - [`reply`] - multi-value replies
//! - [`error`] - the crate [`enum@Error`] type

pub mod config;
pub mod database;
pub mod error;
pub mod hash;
pub mod reply;
mod scan;
pub mod sorted;

pub use config::{Config, DatabaseBuilder};
pub use database::{Database, DbTransaction, TransactionExt};
pub use error::{Error, Result};
pub use hash::HashBucket;
pub use reply::Reply;
pub use sorted::{IndexReport, ScoredMember, SortedIndex};

pub use kvstruct_core::encoding::b254;
pub use kvstruct_core::{SCORE_MAX, SCORE_MIN};
pub use kvstruct_storage::{KeyValue, Transaction};
