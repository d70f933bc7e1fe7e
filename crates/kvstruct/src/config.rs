//! Database configuration.
//!
//! [`Config`] holds the options used to open a [`Database`]; [`DatabaseBuilder`]
//! assembles one fluently.
//!
//! ```ignore
//! use kvstruct::DatabaseBuilder;
//!
//! let db = DatabaseBuilder::new()
//!     .path("data.kvstruct")
//!     .cache_size(64 * 1024 * 1024)
//!     .open()?;
//! ```

use std::path::{Path, PathBuf};

use kvstruct_storage::backends::RedbConfig;

use crate::database::Database;
use crate::error::{Error, Result};

/// Configuration options for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the database file. Ignored for in-memory databases.
    pub path: PathBuf,
    /// Keep all data in memory; nothing is written to disk.
    pub in_memory: bool,
    /// Page cache size in bytes. `None` uses the backend default.
    pub cache_size: Option<usize>,
    /// Whether to create the database file if it doesn't exist.
    pub create_if_missing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { path: PathBuf::new(), in_memory: false, cache_size: None, create_if_missing: true }
    }
}

impl Config {
    /// Create a new configuration with the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    /// Create a configuration for an in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { in_memory: true, ..Self::default() }
    }

    /// Set the cache size in bytes.
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
        self
    }

    /// Set whether to create the database if it doesn't exist.
    #[must_use]
    pub const fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Check that the configuration can be opened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if an on-disk database has no path or a zero
    /// cache size was requested.
    pub fn validate(&self) -> Result<()> {
        if !self.in_memory && self.path.as_os_str().is_empty() {
            return Err(Error::config("a path is required unless the database is in memory"));
        }
        if self.cache_size == Some(0) {
            return Err(Error::config("cache size must be greater than zero"));
        }
        Ok(())
    }

    /// The storage-level options for this configuration.
    #[must_use]
    pub fn redb_config(&self) -> RedbConfig {
        let mut redb_config = RedbConfig::new().create_if_missing(self.create_if_missing);
        if let Some(cache_size) = self.cache_size {
            redb_config = redb_config.cache_size(cache_size);
        }
        redb_config
    }
}

/// Builder for opening a [`Database`].
#[derive(Debug, Clone, Default)]
pub struct DatabaseBuilder {
    config: Config,
}

impl DatabaseBuilder {
    /// Create a builder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for an in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { config: Config::in_memory() }
    }

    /// Set the database file path.
    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.path = path.as_ref().to_path_buf();
        self
    }

    /// Set the cache size in bytes.
    #[must_use]
    pub fn cache_size(mut self, size: usize) -> Self {
        self.config = self.config.cache_size(size);
        self
    }

    /// Set whether to create the database if it doesn't exist.
    #[must_use]
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.config = self.config.create_if_missing(create);
        self
    }

    /// The configuration assembled so far.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Open the database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid configuration and
    /// [`Error::Open`] if the database cannot be opened.
    pub fn open(self) -> Result<Database> {
        Database::open_with_config(self.config)
    }
}
