//! The redb-backed bucket store.
//!
//! Every bucket lives in one physical redb table; see [`super::tables`] for
//! the key layout.

use std::path::Path;

use redb::backends::InMemoryBackend;
use redb::Database;
use tracing::debug;

use crate::engine::{StorageEngine, StorageError};

use super::transaction::RedbTransaction;

/// Options applied when a [`RedbEngine`] opens its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedbConfig {
    /// Page cache budget in bytes. `None` keeps redb's own default.
    pub cache_size: Option<usize>,

    /// Create the file when it is missing. When off, opening a missing file
    /// fails with [`StorageError::Open`].
    pub create_if_missing: bool,
}

impl Default for RedbConfig {
    fn default() -> Self {
        Self { cache_size: None, create_if_missing: true }
    }
}

impl RedbConfig {
    /// Options that create the file on demand and use redb's cache default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a page cache of `bytes`.
    #[must_use]
    pub const fn cache_size(mut self, bytes: usize) -> Self {
        self.cache_size = Some(bytes);
        self
    }

    /// Choose whether a missing file is created.
    #[must_use]
    pub const fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }
}

/// A [`StorageEngine`] whose buckets are stored in a redb file or in memory.
///
/// ```ignore
/// use kvstruct_storage::backends::RedbEngine;
/// use kvstruct_storage::{StorageEngine, Transaction};
///
/// let engine = RedbEngine::open("buckets.redb")?;
/// let mut tx = engine.begin_write()?;
/// tx.create_bucket_if_not_exists(b"counters")?;
/// tx.put(b"counters", b"visits", &7u64.to_be_bytes())?;
/// tx.commit()?;
/// ```
pub struct RedbEngine {
    db: Database,
}

impl RedbEngine {
    /// Open the file at `path`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if redb rejects the file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with_config(path, RedbConfig::default())
    }

    /// Open the file at `path` with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if redb rejects the file, or if it is
    /// missing and `create_if_missing` is off.
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: RedbConfig,
    ) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let mut builder = Database::builder();
        if let Some(bytes) = config.cache_size {
            builder.set_cache_size(bytes);
        }

        let opened =
            if config.create_if_missing { builder.create(path) } else { builder.open(path) };
        let db = opened.map_err(|e| StorageError::Open(e.to_string()))?;

        debug!(path = %path.display(), cache_size = ?config.cache_size, "opened bucket store");
        Ok(Self { db })
    }

    /// A store that lives only as long as the engine.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if redb cannot set up the backend.
    pub fn in_memory() -> Result<Self, StorageError> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(|e| StorageError::Open(e.to_string()))?;

        debug!("opened in-memory bucket store");
        Ok(Self { db })
    }
}

impl StorageEngine for RedbEngine {
    type Transaction<'a> = RedbTransaction;

    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError> {
        match self.db.begin_read() {
            Ok(tx) => Ok(RedbTransaction::new_read(tx)),
            Err(e) => Err(StorageError::Transaction(e.to_string())),
        }
    }

    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError> {
        match self.db.begin_write() {
            Ok(tx) => Ok(RedbTransaction::new_write(tx)),
            Err(e) => Err(StorageError::Transaction(e.to_string())),
        }
    }
}
