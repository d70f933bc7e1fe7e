//! The bucket store interface.
//!
//! - [`StorageEngine`] - Opens transactions
//! - [`Transaction`] - Atomic bucket and key-value operations
//! - [`Cursor`] - Ordered iteration over the keys of one bucket
//!
//! A bucket is an independent ordered map from byte-string keys to byte-string
//! values, addressed by a byte-string name. Each bucket also owns a `u64`
//! sequence counter.

use std::sync::Arc;

use super::StorageError;

/// An owned `(key, value)` entry of a bucket.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// What every cursor movement returns: the entry it lands on, if any.
pub type CursorResult = Result<Option<KeyValue>, StorageError>;

/// A storage engine that provides transactional bucket operations.
///
/// Implementations must be thread-safe (`Send + Sync`). Write transactions are
/// serialized by the backend; read transactions see a consistent snapshot and
/// may run concurrently.
///
/// # Example
///
/// ```ignore
/// use kvstruct_storage::{StorageEngine, StorageError, Transaction};
///
/// fn count_visit<E: StorageEngine>(engine: &E) -> Result<u64, StorageError> {
///     let mut writer = engine.begin_write()?;
///     writer.create_bucket_if_not_exists(b"visits")?;
///     let n = writer.next_sequence(b"visits")?;
///     writer.commit()?;
///
///     let reader = engine.begin_read()?;
///     assert_eq!(reader.sequence(b"visits")?, n);
///     Ok(n)
/// }
/// ```
pub trait StorageEngine: Send + Sync {
    /// Transactions handed out by this engine.
    type Transaction<'a>: Transaction
    where
        Self: 'a;

    /// Start a snapshot read.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the backend refuses to start one.
    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Start a write. Writers are serialized by the backend.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the backend refuses to start one.
    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Push buffered writes to disk. A no-op for backends that are durable on
    /// commit.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the backend fails to write out.
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// A transaction over a set of named buckets.
///
/// All changes made through a write transaction become visible together on
/// [`commit`](Transaction::commit). Dropping a write transaction without
/// committing discards them.
///
/// Every mutating method fails with [`StorageError::ReadOnly`] when called on
/// a read-only transaction.
pub trait Transaction {
    /// Cursors over one bucket of this transaction.
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Check whether a bucket exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn bucket_exists(&self, bucket: &[u8]) -> Result<bool, StorageError>;

    /// Create a bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketExists`] if the bucket already exists.
    fn create_bucket(&mut self, bucket: &[u8]) -> Result<(), StorageError>;

    /// Create a bucket unless it already exists.
    ///
    /// # Returns
    ///
    /// Returns `Ok(true)` if the bucket was created, `Ok(false)` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn create_bucket_if_not_exists(&mut self, bucket: &[u8]) -> Result<bool, StorageError>;

    /// Delete a bucket together with all of its keys and its sequence counter.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketNotFound`] if the bucket doesn't exist.
    fn delete_bucket(&mut self, bucket: &[u8]) -> Result<(), StorageError>;

    /// Look up `key` in `bucket`, returning `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketNotFound`] if the bucket doesn't exist.
    fn get(&self, bucket: &[u8], key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Put a key-value pair into a bucket, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketNotFound`] if the bucket doesn't exist.
    fn put(&mut self, bucket: &[u8], key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Remove `key` from `bucket`. The result says whether the key was there.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketNotFound`] if the bucket doesn't exist.
    fn delete(&mut self, bucket: &[u8], key: &[u8]) -> Result<bool, StorageError>;

    /// Create a cursor over all key-value pairs in a bucket.
    ///
    /// The cursor starts unpositioned and must be positioned with
    /// [`Cursor::seek`], [`Cursor::seek_first`] or [`Cursor::seek_last`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketNotFound`] if the bucket doesn't exist.
    fn cursor(&self, bucket: &[u8]) -> Result<Self::Cursor<'_>, StorageError>;

    /// Current value of a bucket's sequence counter.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketNotFound`] if the bucket doesn't exist.
    fn sequence(&self, bucket: &[u8]) -> Result<u64, StorageError>;

    /// Overwrite a bucket's sequence counter.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketNotFound`] if the bucket doesn't exist.
    fn set_sequence(&mut self, bucket: &[u8], value: u64) -> Result<(), StorageError>;

    /// Advance a bucket's sequence counter by one and return the new value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketNotFound`] if the bucket doesn't exist and
    /// [`StorageError::SequenceOverflow`] if the counter is already at `u64::MAX`.
    fn next_sequence(&mut self, bucket: &[u8]) -> Result<u64, StorageError>;

    /// Publish every change made by this transaction at once.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the backend fails to commit.
    fn commit(self) -> Result<(), StorageError>;

    /// Throw away every change made by this transaction. Ends a read
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the backend fails to abort.
    fn rollback(self) -> Result<(), StorageError>;

    /// `true` for snapshot reads.
    fn is_read_only(&self) -> bool;
}

/// A cursor for ordered iteration over the key-value pairs of one bucket.
///
/// ```ignore
/// let mut cursor = tx.cursor(b"events")?;
///
/// // Everything from "2024-" onwards, newest last.
/// let mut entry = cursor.seek(b"2024-")?;
/// while let Some((key, value)) = entry {
///     handle(&key, &value);
///     entry = cursor.next()?;
/// }
/// ```
pub trait Cursor {
    /// Land on the smallest key that is `>= key`, or `None` past the end.
    fn seek(&mut self, key: &[u8]) -> CursorResult;

    /// Seek to the first key-value pair, or `None` if the bucket is empty.
    fn seek_first(&mut self) -> CursorResult;

    /// Seek to the last key-value pair, or `None` if the bucket is empty.
    fn seek_last(&mut self) -> CursorResult;

    /// Move to the next key-value pair, or `None` if at the end.
    ///
    /// An unpositioned cursor moves to the first pair.
    fn next(&mut self) -> CursorResult;

    /// Move to the previous key-value pair, or `None` if at the beginning.
    ///
    /// An unpositioned cursor moves to the last pair.
    fn prev(&mut self) -> CursorResult;

    /// Get the current key-value pair without moving.
    ///
    /// Returns `None` if the cursor is not positioned at a valid entry.
    fn current(&self) -> Option<(&[u8], &[u8])>;
}

/// Shared engines open transactions on the engine they point to.
impl<E: StorageEngine> StorageEngine for Arc<E> {
    type Transaction<'a>
        = E::Transaction<'a>
    where
        Self: 'a;

    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError> {
        (**self).begin_read()
    }

    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError> {
        (**self).begin_write()
    }

    fn flush(&self) -> Result<(), StorageError> {
        (**self).flush()
    }
}
