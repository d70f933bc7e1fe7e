//! Hash collections.
//!
//! A hash collection is a named key-value table stored in a single bucket,
//! `[0x30][name]`. Keys are returned in byte order by the scans, and any value
//! can double as a counter through [`HashBucket::increment`], which stores it
//! as eight big-endian bytes.

use kvstruct_core::encoding::keys::hash_bucket;
use kvstruct_core::{apply_step, decode_score, encode_score};
use kvstruct_storage::{KeyValue, Transaction};
use tracing::debug;

use crate::error::{Error, Result};
use crate::reply::Reply;
use crate::scan::{collect_after, collect_before};

/// Hash collection operations bound to a transaction.
///
/// The accessor borrows the transaction, so it can never outlive it. Build a
/// fresh one whenever it is needed; it holds no state of its own.
///
/// ```ignore
/// db.update(|tx| {
///     let mut hash = HashBucket::new(tx);
///     hash.set("users", b"alice", b"admin")?;
///     let visits = hash.increment("visits", b"alice", 1)?;
///     Ok(visits)
/// })?;
/// ```
pub struct HashBucket<'t, T: Transaction> {
    tx: &'t mut T,
}

impl<'t, T: Transaction> HashBucket<'t, T> {
    /// Bind hash operations to `tx`.
    pub fn new(tx: &'t mut T) -> Self {
        Self { tx }
    }

    /// Set `key` to `value`, creating the collection if needed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn set(&mut self, name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let bucket = self.create(name)?;
        self.tx.put(&bucket, key, value)?;
        Ok(())
    }

    /// Set several keys at once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `pairs` is empty.
    pub fn multi_set<K, V>(&mut self, name: &str, pairs: &[(K, V)]) -> Result<()>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        if pairs.is_empty() {
            return Err(Error::invalid_argument("no key-value pairs given"));
        }
        let bucket = self.create(name)?;
        for (key, value) in pairs {
            self.tx.put(&bucket, key.as_ref(), value.as_ref())?;
        }
        Ok(())
    }

    /// Set several keys from an interleaved `key, value, key, value, ...` list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the list is empty or has an odd
    /// number of items. Nothing is written in that case.
    pub fn multi_set_flat<B: AsRef<[u8]>>(&mut self, name: &str, items: &[B]) -> Result<()> {
        if items.is_empty() || items.len() % 2 != 0 {
            return Err(Error::invalid_argument(format!(
                "expected an even, non-zero number of items, got {}",
                items.len()
            )));
        }
        let pairs: Vec<(&[u8], &[u8])> =
            items.chunks_exact(2).map(|pair| (pair[0].as_ref(), pair[1].as_ref())).collect();
        self.multi_set(name, &pairs)
    }

    /// Add `step` to the counter stored at `key` and return the new value.
    ///
    /// A missing key counts from zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Overflow`] or [`Error::Underflow`] if the result does
    /// not fit in a `u64`, and [`Error::MalformedEncoding`] if the stored
    /// value is not eight bytes. Nothing is written on failure, not even the
    /// collection.
    pub fn increment(&mut self, name: &str, key: &[u8], step: i64) -> Result<u64> {
        let bucket = hash_bucket(name);
        let stored =
            if self.tx.bucket_exists(&bucket)? { self.tx.get(&bucket, key)? } else { None };
        let current = match stored {
            Some(raw) => decode_score(&raw)?,
            None => 0,
        };
        let value = apply_step(current, step)?;

        self.create(name)?;
        self.tx.put(&bucket, key, &encode_score(value))?;
        Ok(value)
    }

    /// Get the value stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketNotFound`] if the collection doesn't exist and
    /// [`Error::KeyNotFound`] if the key has no value.
    pub fn get(&self, name: &str, key: &[u8]) -> Result<Vec<u8>> {
        let bucket = self.require(name)?;
        self.tx.get(&bucket, key)?.ok_or_else(|| Error::KeyNotFound(key.to_vec()))
    }

    /// Get the values of several keys, in request order.
    ///
    /// Keys without a value are skipped, so the reply may be shorter than
    /// `keys`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketNotFound`] if the collection doesn't exist.
    pub fn multi_get<K: AsRef<[u8]>>(&self, name: &str, keys: &[K]) -> Result<Reply> {
        let bucket = self.require(name)?;
        let mut reply = Reply::with_msg("ok");
        for key in keys {
            if let Some(value) = self.tx.get(&bucket, key.as_ref())? {
                reply.push(value);
            }
        }
        Ok(reply)
    }

    /// Delete `key`. Deleting from a missing collection does nothing.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn delete(&mut self, name: &str, key: &[u8]) -> Result<()> {
        self.multi_delete(name, &[key])
    }

    /// Delete several keys. Deleting from a missing collection does nothing.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn multi_delete<K: AsRef<[u8]>>(&mut self, name: &str, keys: &[K]) -> Result<()> {
        let bucket = hash_bucket(name);
        if !self.tx.bucket_exists(&bucket)? {
            return Ok(());
        }
        for key in keys {
            self.tx.delete(&bucket, key.as_ref())?;
        }
        Ok(())
    }

    /// Delete the whole collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketNotFound`] if the collection doesn't exist.
    pub fn delete_collection(&mut self, name: &str) -> Result<()> {
        let bucket = self.require(name)?;
        self.tx.delete_bucket(&bucket)?;
        debug!(collection = name, "deleted hash collection");
        Ok(())
    }

    /// Up to `limit` entries with keys strictly greater than `key_start`, in
    /// ascending key order. An empty `key_start` scans from the beginning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketNotFound`] if the collection doesn't exist.
    pub fn scan_forward(
        &self,
        name: &str,
        key_start: &[u8],
        limit: usize,
    ) -> Result<Vec<KeyValue>> {
        let bucket = self.require(name)?;
        let mut cursor = self.tx.cursor(&bucket)?;
        Ok(collect_after(&mut cursor, key_start, limit)?)
    }

    /// Up to `limit` entries with keys strictly less than `key_start`, in
    /// descending key order. An empty `key_start` scans from the last entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketNotFound`] if the collection doesn't exist.
    pub fn scan_backward(
        &self,
        name: &str,
        key_start: &[u8],
        limit: usize,
    ) -> Result<Vec<KeyValue>> {
        let bucket = self.require(name)?;
        let bound = (!key_start.is_empty()).then_some(key_start);
        let mut cursor = self.tx.cursor(&bucket)?;
        Ok(collect_before(&mut cursor, bound, limit)?)
    }

    /// Current value of the collection's sequence counter, or 0 if the
    /// collection doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub fn sequence(&self, name: &str) -> Result<u64> {
        let bucket = hash_bucket(name);
        if !self.tx.bucket_exists(&bucket)? {
            return Ok(0);
        }
        Ok(self.tx.sequence(&bucket)?)
    }

    /// Overwrite the collection's sequence counter, creating the collection
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn set_sequence(&mut self, name: &str, value: u64) -> Result<()> {
        let bucket = self.create(name)?;
        self.tx.set_sequence(&bucket, value)?;
        Ok(())
    }

    /// Advance the collection's sequence counter and return the new value,
    /// creating the collection if needed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the counter is exhausted or the write fails.
    pub fn next_sequence(&mut self, name: &str) -> Result<u64> {
        let bucket = self.create(name)?;
        Ok(self.tx.next_sequence(&bucket)?)
    }

    /// Returns `true` if the collection exists.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.tx.bucket_exists(&hash_bucket(name))?)
    }

    fn create(&mut self, name: &str) -> Result<Vec<u8>> {
        let bucket = hash_bucket(name);
        if self.tx.create_bucket_if_not_exists(&bucket)? {
            debug!(collection = name, "created hash collection");
        }
        Ok(bucket)
    }

    fn require(&self, name: &str) -> Result<Vec<u8>> {
        let bucket = hash_bucket(name);
        if !self.tx.bucket_exists(&bucket)? {
            return Err(Error::BucketNotFound(name.to_string()));
        }
        Ok(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvstruct_storage::backends::RedbEngine;
    use kvstruct_storage::StorageEngine;

    #[test]
    fn test_set_get_delete() {
        let engine = RedbEngine::in_memory().unwrap();
        let mut tx = engine.begin_write().unwrap();
        let mut hash = HashBucket::new(&mut tx);

        hash.set("h", b"k", b"v").unwrap();
        assert_eq!(hash.get("h", b"k").unwrap(), b"v".to_vec());

        hash.delete("h", b"k").unwrap();
        assert!(matches!(hash.get("h", b"k"), Err(Error::KeyNotFound(_))));
        assert!(hash.exists("h").unwrap());
    }

    #[test]
    fn test_increment_from_zero() {
        let engine = RedbEngine::in_memory().unwrap();
        let mut tx = engine.begin_write().unwrap();
        let mut hash = HashBucket::new(&mut tx);

        assert_eq!(hash.increment("c", b"n", 5).unwrap(), 5);
        assert_eq!(hash.increment("c", b"n", -2).unwrap(), 3);
        assert_eq!(hash.get("c", b"n").unwrap(), 3u64.to_be_bytes().to_vec());
    }

    #[test]
    fn test_increment_rejects_non_counter() {
        let engine = RedbEngine::in_memory().unwrap();
        let mut tx = engine.begin_write().unwrap();
        let mut hash = HashBucket::new(&mut tx);

        hash.set("c", b"n", b"abc").unwrap();
        assert!(matches!(hash.increment("c", b"n", 1), Err(Error::MalformedEncoding(_))));
        assert_eq!(hash.get("c", b"n").unwrap(), b"abc".to_vec());
    }

    #[test]
    fn test_failed_increment_creates_nothing() {
        let engine = RedbEngine::in_memory().unwrap();
        let mut tx = engine.begin_write().unwrap();
        let mut hash = HashBucket::new(&mut tx);

        assert!(matches!(hash.increment("c", b"n", -1), Err(Error::Underflow { .. })));
        assert!(!hash.exists("c").unwrap());
    }

    #[test]
    fn test_delete_from_missing_collection() {
        let engine = RedbEngine::in_memory().unwrap();
        let mut tx = engine.begin_write().unwrap();
        let mut hash = HashBucket::new(&mut tx);

        hash.delete("nope", b"k").unwrap();
        assert!(!hash.exists("nope").unwrap());
    }
}
