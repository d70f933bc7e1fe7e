//! Redb transaction implementation.
//!
//! This module provides the `RedbTransaction` type which implements the
//! `Transaction` trait for both read-only and read-write transactions.
//!
//! # Memory-Efficient Cursors
//!
//! The cursor implementation uses batched streaming to avoid loading entire
//! buckets into memory. It holds at most one batch of entries (default 1000),
//! fetching the neighbouring batch on demand as the cursor moves past either
//! end of the current one.

use std::ops::Bound;

use redb::{ReadTransaction, ReadableTable, WriteTransaction};
use tracing::debug;

use crate::engine::{Cursor, CursorResult, KeyValue, StorageError, StorageResult, Transaction};

use super::tables::{
    bucket_end_key, bucket_prefix, decode_key, encode_key, BUCKETS_TABLE, DATA_TABLE,
};

/// Default batch size for cursor operations.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Open `$def` in either transaction mode and evaluate `$body` with the table
/// bound to `$table`. In a read transaction a table that was never created
/// evaluates to `Ok($missing)`.
macro_rules! with_table {
    ($tx:expr, $def:expr, $missing:expr, |$table:ident| $body:expr) => {
        match $tx {
            RedbTransaction::Read(tx) => match tx.open_table($def) {
                Ok($table) => $body,
                Err(redb::TableError::TableDoesNotExist(_)) => Ok($missing),
                Err(e) => Err(internal(e)),
            },
            RedbTransaction::Write(tx) => match tx.open_table($def) {
                Ok($table) => $body,
                Err(e) => Err(internal(e)),
            },
        }
    };
}

fn internal(e: impl std::fmt::Display) -> StorageError {
    StorageError::Internal(e.to_string())
}

/// A transaction for the Redb storage engine.
///
/// This type wraps both read-only and read-write Redb transactions,
/// providing a unified interface through the `Transaction` trait.
#[allow(clippy::large_enum_variant)]
pub enum RedbTransaction {
    /// A read-only transaction.
    Read(ReadTransaction),
    /// A read-write transaction.
    Write(WriteTransaction),
}

impl RedbTransaction {
    /// Create a new read-only transaction.
    pub const fn new_read(tx: ReadTransaction) -> Self {
        Self::Read(tx)
    }

    /// Create a new read-write transaction.
    pub const fn new_write(tx: WriteTransaction) -> Self {
        Self::Write(tx)
    }

    /// Create a cursor that fetches `batch_size` entries at a time.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketNotFound`] if the bucket doesn't exist.
    pub fn cursor_with_batch_size(
        &self,
        bucket: &[u8],
        batch_size: usize,
    ) -> StorageResult<RedbCursor<'_>> {
        self.require_bucket(bucket)?;
        Ok(RedbCursor::new(self, bucket.to_vec(), batch_size.max(1)))
    }

    fn writer(&self) -> StorageResult<&WriteTransaction> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write(tx) => Ok(tx),
        }
    }

    /// The bucket's sequence counter, or `None` if the bucket doesn't exist.
    fn registered_sequence(&self, bucket: &[u8]) -> StorageResult<Option<u64>> {
        with_table!(self, BUCKETS_TABLE, None, |table| {
            Ok(table.get(bucket).map_err(internal)?.map(|seq| seq.value()))
        })
    }

    fn require_bucket(&self, bucket: &[u8]) -> StorageResult<u64> {
        self.registered_sequence(bucket)?
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_vec()))
    }

    fn write_sequence(&self, bucket: &[u8], value: u64) -> StorageResult<()> {
        let tx = self.writer()?;
        let mut table = tx.open_table(BUCKETS_TABLE).map_err(internal)?;
        table.insert(bucket, value).map_err(internal)?;
        Ok(())
    }

    /// Fetch up to `limit` entries of a bucket in ascending key order,
    /// starting from `from`.
    fn fetch_forward(
        &self,
        bucket: &[u8],
        from: Bound<&[u8]>,
        limit: usize,
    ) -> StorageResult<Vec<KeyValue>> {
        let start = match from {
            Bound::Included(key) | Bound::Excluded(key) => encode_key(bucket, key),
            Bound::Unbounded => bucket_prefix(bucket),
        };
        let end = bucket_end_key(bucket);
        let skip = match from {
            Bound::Excluded(key) => Some(key),
            _ => None,
        };

        with_table!(self, DATA_TABLE, Vec::new(), |table| {
            let range = match &end {
                Some(end) => table.range(start.as_slice()..end.as_slice()),
                None => table.range(start.as_slice()..),
            }
            .map_err(internal)?;

            let mut entries = Vec::with_capacity(limit.min(1024));
            for result in range {
                if entries.len() >= limit {
                    break;
                }
                let (k, v) = result.map_err(internal)?;
                let Some((_, key)) = decode_key(k.value()) else {
                    return Err(internal("malformed physical key"));
                };
                // Only the first entry can equal an excluded start key.
                if skip == Some(key) {
                    continue;
                }
                entries.push((key.to_vec(), v.value().to_vec()));
            }
            Ok(entries)
        })
    }

    /// Fetch up to `limit` entries of a bucket that sort strictly before
    /// `before` (or the last entries when `before` is `None`).
    ///
    /// Returns entries in ascending key order, even though they are fetched
    /// from the end.
    fn fetch_backward(
        &self,
        bucket: &[u8],
        before: Option<&[u8]>,
        limit: usize,
    ) -> StorageResult<Vec<KeyValue>> {
        let start = bucket_prefix(bucket);
        let end = match before {
            Some(key) => Some(encode_key(bucket, key)),
            None => bucket_end_key(bucket),
        };

        with_table!(self, DATA_TABLE, Vec::new(), |table| {
            let range = match &end {
                Some(end) => table.range(start.as_slice()..end.as_slice()),
                None => table.range(start.as_slice()..),
            }
            .map_err(internal)?;

            let mut entries = Vec::with_capacity(limit.min(1024));
            for result in range.rev() {
                if entries.len() >= limit {
                    break;
                }
                let (k, v) = result.map_err(internal)?;
                let Some((_, key)) = decode_key(k.value()) else {
                    return Err(internal("malformed physical key"));
                };
                entries.push((key.to_vec(), v.value().to_vec()));
            }
            entries.reverse();
            Ok(entries)
        })
    }
}

impl Transaction for RedbTransaction {
    type Cursor<'a>
        = RedbCursor<'a>
    where
        Self: 'a;

    fn bucket_exists(&self, bucket: &[u8]) -> Result<bool, StorageError> {
        Ok(self.registered_sequence(bucket)?.is_some())
    }

    fn create_bucket(&mut self, bucket: &[u8]) -> Result<(), StorageError> {
        if !self.create_bucket_if_not_exists(bucket)? {
            return Err(StorageError::BucketExists(bucket.to_vec()));
        }
        Ok(())
    }

    fn create_bucket_if_not_exists(&mut self, bucket: &[u8]) -> Result<bool, StorageError> {
        self.writer()?;
        if self.bucket_exists(bucket)? {
            return Ok(false);
        }
        self.write_sequence(bucket, 0)?;
        debug!(bucket = %bucket.escape_ascii(), "created bucket");
        Ok(true)
    }

    fn delete_bucket(&mut self, bucket: &[u8]) -> Result<(), StorageError> {
        let tx = self.writer()?;
        {
            let mut registry = tx.open_table(BUCKETS_TABLE).map_err(internal)?;
            if registry.remove(bucket).map_err(internal)?.is_none() {
                return Err(StorageError::BucketNotFound(bucket.to_vec()));
            }
        }

        let start = bucket_prefix(bucket);
        let end = bucket_end_key(bucket);
        let mut table = tx.open_table(DATA_TABLE).map_err(internal)?;
        let keys = {
            let range = match &end {
                Some(end) => table.range(start.as_slice()..end.as_slice()),
                None => table.range(start.as_slice()..),
            }
            .map_err(internal)?;
            range
                .map(|entry| entry.map(|(k, _)| k.value().to_vec()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(internal)?
        };
        for key in &keys {
            table.remove(key.as_slice()).map_err(internal)?;
        }

        debug!(bucket = %bucket.escape_ascii(), keys = keys.len(), "deleted bucket");
        Ok(())
    }

    fn get(&self, bucket: &[u8], key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.require_bucket(bucket)?;
        let encoded_key = encode_key(bucket, key);
        with_table!(self, DATA_TABLE, None, |table| {
            Ok(table.get(encoded_key.as_slice()).map_err(internal)?.map(|v| v.value().to_vec()))
        })
    }

    fn put(&mut self, bucket: &[u8], key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let tx = self.writer()?;
        self.require_bucket(bucket)?;
        let encoded_key = encode_key(bucket, key);
        let mut table = tx.open_table(DATA_TABLE).map_err(internal)?;
        table.insert(encoded_key.as_slice(), value).map_err(internal)?;
        Ok(())
    }

    fn delete(&mut self, bucket: &[u8], key: &[u8]) -> Result<bool, StorageError> {
        let tx = self.writer()?;
        self.require_bucket(bucket)?;
        let encoded_key = encode_key(bucket, key);
        let mut table = tx.open_table(DATA_TABLE).map_err(internal)?;
        let removed = table.remove(encoded_key.as_slice()).map_err(internal)?;
        Ok(removed.is_some())
    }

    fn cursor(&self, bucket: &[u8]) -> Result<Self::Cursor<'_>, StorageError> {
        self.cursor_with_batch_size(bucket, DEFAULT_BATCH_SIZE)
    }

    fn sequence(&self, bucket: &[u8]) -> Result<u64, StorageError> {
        self.require_bucket(bucket)
    }

    fn set_sequence(&mut self, bucket: &[u8], value: u64) -> Result<(), StorageError> {
        self.writer()?;
        self.require_bucket(bucket)?;
        self.write_sequence(bucket, value)
    }

    fn next_sequence(&mut self, bucket: &[u8]) -> Result<u64, StorageError> {
        self.writer()?;
        let next = self
            .require_bucket(bucket)?
            .checked_add(1)
            .ok_or_else(|| StorageError::SequenceOverflow(bucket.to_vec()))?;
        self.write_sequence(bucket, next)?;
        Ok(next)
    }

    fn commit(self) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Ok(()),
            Self::Write(tx) => tx.commit().map_err(|e| StorageError::Transaction(e.to_string())),
        }
    }

    fn rollback(self) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Ok(()),
            Self::Write(tx) => tx.abort().map_err(|e| StorageError::Transaction(e.to_string())),
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}

/// A memory-efficient cursor for iterating over the entries of one bucket.
///
/// At any time the cursor holds at most `batch_size` entries, plus the
/// current entry. Moving past either end of the batch fetches the adjacent
/// batch from the transaction.
pub struct RedbCursor<'a> {
    /// Reference to the transaction for fetching additional batches.
    tx: &'a RedbTransaction,
    /// The bucket being iterated.
    bucket: Vec<u8>,
    /// Current batch of entries, in ascending key order.
    batch: Vec<KeyValue>,
    /// Position within the current batch.
    position: Option<usize>,
    /// Maximum entries per batch.
    batch_size: usize,
}

impl<'a> RedbCursor<'a> {
    fn new(tx: &'a RedbTransaction, bucket: Vec<u8>, batch_size: usize) -> Self {
        Self { tx, bucket, batch: Vec::new(), position: None, batch_size }
    }

    /// Replace the batch and move to `position`, or unposition the cursor
    /// when the batch is empty.
    fn land(&mut self, batch: Vec<KeyValue>, at_end: bool) -> CursorResult {
        self.batch = batch;
        if self.batch.is_empty() {
            self.position = None;
            return Ok(None);
        }
        let position = if at_end { self.batch.len() - 1 } else { 0 };
        self.position = Some(position);
        Ok(self.batch.get(position).cloned())
    }

    fn entry_at(&mut self, position: usize) -> CursorResult {
        self.position = Some(position);
        Ok(self.batch.get(position).cloned())
    }
}

impl Cursor for RedbCursor<'_> {
    fn seek(&mut self, key: &[u8]) -> CursorResult {
        let batch = self.tx.fetch_forward(&self.bucket, Bound::Included(key), self.batch_size)?;
        self.land(batch, false)
    }

    fn seek_first(&mut self) -> CursorResult {
        let batch = self.tx.fetch_forward(&self.bucket, Bound::Unbounded, self.batch_size)?;
        self.land(batch, false)
    }

    fn seek_last(&mut self) -> CursorResult {
        let batch = self.tx.fetch_backward(&self.bucket, None, self.batch_size)?;
        self.land(batch, true)
    }

    fn next(&mut self) -> CursorResult {
        let Some(position) = self.position else {
            return self.seek_first();
        };
        if position + 1 < self.batch.len() {
            return self.entry_at(position + 1);
        }
        let after = self.batch.last().map(|(k, _)| k.clone()).unwrap_or_default();
        let batch =
            self.tx.fetch_forward(&self.bucket, Bound::Excluded(&after), self.batch_size)?;
        self.land(batch, false)
    }

    fn prev(&mut self) -> CursorResult {
        let Some(position) = self.position else {
            return self.seek_last();
        };
        if position > 0 {
            return self.entry_at(position - 1);
        }
        let before = self.batch.first().map(|(k, _)| k.clone()).unwrap_or_default();
        let batch = self.tx.fetch_backward(&self.bucket, Some(&before), self.batch_size)?;
        self.land(batch, true)
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        self.position
            .and_then(|pos| self.batch.get(pos))
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

// Cursor behaviour across batch boundaries is covered by tests/redb_tests.rs,
// since the streaming cursor requires a real transaction context.
