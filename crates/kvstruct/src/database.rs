//! The [`Database`] handle: opening a store and running transactions on it.
//!
//! # Examples
//!
//! ```ignore
//! use kvstruct::{Database, TransactionExt};
//!
//! let db = Database::open("data.kvstruct")?;
//!
//! // Writes commit when the closure succeeds and roll back when it fails.
//! db.update(|tx| {
//!     tx.sorted().set("leaderboard", b"alice", 120)?;
//!     tx.hash().set("profiles", b"alice", b"{\"level\":3}")?;
//!     Ok(())
//! })?;
//!
//! // Reads run on a consistent snapshot.
//! let top = db.view(|tx| tx.sorted().scan_backward("leaderboard", b"", None, 10))?;
//! ```

use std::path::Path;

use kvstruct_storage::backends::{RedbEngine, RedbTransaction};
use kvstruct_storage::{StorageEngine, Transaction};
use tracing::{debug, warn};

use crate::config::{Config, DatabaseBuilder};
use crate::error::{Error, Result};
use crate::hash::HashBucket;
use crate::sorted::SortedIndex;

/// The transaction type handed out by a [`Database`].
pub type DbTransaction = RedbTransaction;

/// Convenience constructors for the collection accessors.
///
/// Each call builds a fresh accessor that borrows the transaction; nothing is
/// cached on the transaction itself.
pub trait TransactionExt: Transaction + Sized {
    /// Hash collection operations on this transaction.
    fn hash(&mut self) -> HashBucket<'_, Self> {
        HashBucket::new(self)
    }

    /// Sorted index operations on this transaction.
    fn sorted(&mut self) -> SortedIndex<'_, Self> {
        SortedIndex::new(self)
    }
}

impl<T: Transaction> TransactionExt for T {}

/// A `kvstruct` database handle.
///
/// # Thread Safety
///
/// `Database` is `Send + Sync` and can be shared across threads. Write
/// transactions are serialized; read transactions run concurrently on
/// consistent snapshots.
pub struct Database {
    /// The storage engine.
    engine: RedbEngine,
    /// The options this handle was opened with.
    config: Config,
}

impl Database {
    /// Open the file at `path`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the file cannot be used.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        DatabaseBuilder::new().path(path).open()
    }

    /// A database that lives only as long as the handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the backend cannot be set up.
    pub fn in_memory() -> Result<Self> {
        DatabaseBuilder::in_memory().open()
    }

    /// Open a database as described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid configuration and
    /// [`Error::Open`] if the database cannot be opened.
    pub fn open_with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let engine = if config.in_memory {
            RedbEngine::in_memory().map_err(|e| Error::Open(e.to_string()))?
        } else {
            RedbEngine::open_with_config(&config.path, config.redb_config())
                .map_err(|e| Error::Open(e.to_string()))?
        };

        debug!(path = %config.path.display(), in_memory = config.in_memory, "opened database");
        Ok(Self { engine, config })
    }

    /// Start describing a database to open.
    #[must_use]
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// The options this handle was opened with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Start a write transaction.
    ///
    /// The caller must [`commit`](Transaction::commit) it; dropping it
    /// discards every change.
    ///
    /// # Errors
    ///
    /// Returns a storage error if another failure keeps the write from starting.
    pub fn begin_write(&self) -> Result<DbTransaction> {
        Ok(self.engine.begin_write()?)
    }

    /// Begin a read-only transaction on a consistent snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot cannot be taken.
    pub fn begin_read(&self) -> Result<DbTransaction> {
        Ok(self.engine.begin_read()?)
    }

    /// Run `f` in a write transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back when it
    /// returns `Err`. A panic inside `f` drops the transaction, which also
    /// discards its changes.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a storage error if the transaction
    /// cannot be started or committed.
    pub fn update<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut DbTransaction) -> Result<R>,
    {
        let mut tx = self.begin_write()?;
        match f(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "rolling back write transaction");
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Run `f` in a read-only transaction.
    ///
    /// Any write attempted inside `f` fails with a read-only storage error.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a storage error if the transaction
    /// cannot be started.
    pub fn view<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut DbTransaction) -> Result<R>,
    {
        let mut tx = self.begin_read()?;
        let result = f(&mut tx);
        tx.rollback()?;
        result
    }

    /// Push buffered writes to disk.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write-out fails.
    pub fn flush(&self) -> Result<()> {
        Ok(self.engine.flush()?)
    }

    /// Close the database.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered data cannot be flushed.
    pub fn close(self) -> Result<()> {
        self.flush()?;
        debug!(path = %self.config.path.display(), "closed database");
        Ok(())
    }
}
