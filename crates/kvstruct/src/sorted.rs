//! Sorted indexes.
//!
//! A sorted index maps member keys to `u64` scores and can be scanned in
//! score order. Each collection is stored in two buckets that are kept in
//! step inside the caller's transaction:
//!
//! ```text
//! primary  [0x1D][name]:  member          -> score (8 bytes, big-endian)
//! index    [0x1F][name]:  score ++ member -> (empty)
//! ```
//!
//! The primary bucket answers point lookups. The index bucket is ordered by
//! score and then by member, so a cursor walk over it is a range scan by
//! score.
//!
//! # Consistency
//!
//! For every member with score `s` in the primary bucket, the index bucket
//! holds exactly one entry, `s ++ member`. Every write that changes a score
//! inserts the new index entry, updates the primary entry and removes the old
//! index entry in the same transaction. [`SortedIndex::verify`] audits a
//! collection against this rule.

use kvstruct_core::encoding::keys::{
    decode_index_key, encode_index_key, sorted_index_bucket, sorted_primary_bucket,
};
use kvstruct_core::{apply_step, decode_score, encode_score, SCORE_MAX, SCORE_MIN};
use kvstruct_storage::{Cursor, Transaction};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::scan::{collect_after, collect_before};

/// A member key with its score.
pub type ScoredMember = (Vec<u8>, u64);

/// Sorted index operations bound to a transaction.
///
/// ```ignore
/// db.update(|tx| {
///     let mut sorted = SortedIndex::new(tx);
///     sorted.set("scores", b"a", 10)?;
///     sorted.set("scores", b"b", 5)?;
///     sorted.set("scores", b"a", 20)?;
///
///     let members = sorted.scan_forward("scores", 10)?;
///     assert_eq!(members, vec![(b"b".to_vec(), 5), (b"a".to_vec(), 20)]);
///     Ok(())
/// })?;
/// ```
pub struct SortedIndex<'t, T: Transaction> {
    tx: &'t mut T,
}

/// The bucket names of one sorted index collection.
struct Buckets {
    primary: Vec<u8>,
    index: Vec<u8>,
}

impl Buckets {
    fn new(name: &str) -> Self {
        Self { primary: sorted_primary_bucket(name), index: sorted_index_bucket(name) }
    }
}

impl<'t, T: Transaction> SortedIndex<'t, T> {
    /// Bind sorted index operations to `tx`.
    pub fn new(tx: &'t mut T) -> Self {
        Self { tx }
    }

    /// Set the score of `key`, creating the collection if needed.
    ///
    /// Setting the score a member already has changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedEncoding`] if the stored score is corrupt,
    /// or a storage error if a write fails.
    pub fn set(&mut self, name: &str, key: &[u8], score: u64) -> Result<()> {
        let buckets = self.create(name)?;
        let old = self.stored_score(&buckets.primary, key)?;
        self.rescore(&buckets, key, old, score)
    }

    /// Add `step` to the score of `key` and return the new score.
    ///
    /// A missing member starts from zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Overflow`] or [`Error::Underflow`] if the new score
    /// does not fit in a `u64`. Nothing is written on failure, not even the
    /// collection.
    pub fn increment(&mut self, name: &str, key: &[u8], step: i64) -> Result<u64> {
        let primary = sorted_primary_bucket(name);
        let old = if self.tx.bucket_exists(&primary)? {
            self.stored_score(&primary, key)?
        } else {
            None
        };
        let score = apply_step(old.unwrap_or(SCORE_MIN), step)?;

        let buckets = self.create(name)?;
        self.rescore(&buckets, key, old, score)?;
        Ok(score)
    }

    /// Remove `key` from the collection.
    ///
    /// Does nothing when the collection or the member doesn't exist. The
    /// buckets stay in place after the last member is removed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a write fails.
    pub fn delete(&mut self, name: &str, key: &[u8]) -> Result<()> {
        let buckets = Buckets::new(name);
        if !self.tx.bucket_exists(&buckets.primary)? {
            return Ok(());
        }
        if !self.tx.bucket_exists(&buckets.index)? {
            return Ok(());
        }
        let Some(score) = self.stored_score(&buckets.primary, key)? else {
            return Ok(());
        };

        self.tx.delete(&buckets.index, &encode_index_key(score, key))?;
        self.tx.delete(&buckets.primary, key)?;
        trace!(collection = name, key = %key.escape_ascii(), score, "removed member");
        Ok(())
    }

    /// Delete the whole collection, both its buckets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketNotFound`] if neither bucket exists.
    pub fn delete_collection(&mut self, name: &str) -> Result<()> {
        let buckets = Buckets::new(name);
        let mut found = false;
        for bucket in [&buckets.primary, &buckets.index] {
            if self.tx.bucket_exists(bucket)? {
                self.tx.delete_bucket(bucket)?;
                found = true;
            }
        }
        if !found {
            return Err(Error::BucketNotFound(name.to_string()));
        }
        debug!(collection = name, "deleted sorted collection");
        Ok(())
    }

    /// Get the score of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketNotFound`] if the collection doesn't exist and
    /// [`Error::KeyNotFound`] if the member has no score.
    pub fn get(&self, name: &str, key: &[u8]) -> Result<u64> {
        let primary = sorted_primary_bucket(name);
        if !self.tx.bucket_exists(&primary)? {
            return Err(Error::BucketNotFound(name.to_string()));
        }
        self.stored_score(&primary, key)?.ok_or_else(|| Error::KeyNotFound(key.to_vec()))
    }

    /// Up to `limit` members in ascending score order, ties broken by member
    /// key.
    ///
    /// The scan starts strictly after the minimum score with an empty member,
    /// so only an empty member at score zero is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketNotFound`] if the collection doesn't exist.
    pub fn scan_forward(&self, name: &str, limit: usize) -> Result<Vec<ScoredMember>> {
        self.scan_forward_from(name, b"", SCORE_MIN, limit)
    }

    /// Up to `limit` members ordered after `(score_start, key_start)`, in
    /// ascending score order.
    ///
    /// Pass the last member of a page to fetch the next page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketNotFound`] if the collection doesn't exist.
    pub fn scan_forward_from(
        &self,
        name: &str,
        key_start: &[u8],
        score_start: u64,
        limit: usize,
    ) -> Result<Vec<ScoredMember>> {
        let index = self.require_index(name)?;
        let start = encode_index_key(score_start, key_start);
        let mut cursor = self.tx.cursor(&index)?;
        let entries = collect_after(&mut cursor, &start, limit)?;
        entries.iter().map(|(key, _)| split_index_key(key)).collect()
    }

    /// Up to `limit` members ordered before a bound, in descending score
    /// order.
    ///
    /// The bound is the composite `(score_start, key_start)`, with a missing
    /// `score_start` meaning the maximum score. An empty `key_start` includes
    /// every member whose score is at most `score_start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketNotFound`] if the collection doesn't exist.
    pub fn scan_backward(
        &self,
        name: &str,
        key_start: &[u8],
        score_start: Option<u64>,
        limit: usize,
    ) -> Result<Vec<ScoredMember>> {
        let index = self.require_index(name)?;
        let bound = match (key_start.is_empty(), score_start) {
            (false, score) => Some(encode_index_key(score.unwrap_or(SCORE_MAX), key_start)),
            (true, Some(score)) if score < SCORE_MAX => Some(encode_score(score + 1).to_vec()),
            (true, _) => None,
        };

        let mut cursor = self.tx.cursor(&index)?;
        let entries = collect_before(&mut cursor, bound.as_deref(), limit)?;
        entries.iter().map(|(key, _)| split_index_key(key)).collect()
    }

    /// Number of members, or 0 if the collection doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub fn len(&self, name: &str) -> Result<usize> {
        let primary = sorted_primary_bucket(name);
        if !self.tx.bucket_exists(&primary)? {
            return Ok(0);
        }
        let mut cursor = self.tx.cursor(&primary)?;
        let mut count = 0;
        let mut entry = cursor.seek_first()?;
        while entry.is_some() {
            count += 1;
            entry = cursor.next()?;
        }
        Ok(count)
    }

    /// Returns `true` if the collection has no members.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub fn is_empty(&self, name: &str) -> Result<bool> {
        let primary = sorted_primary_bucket(name);
        if !self.tx.bucket_exists(&primary)? {
            return Ok(true);
        }
        Ok(self.tx.cursor(&primary)?.seek_first()?.is_none())
    }

    /// Walk both buckets of a collection and report every entry that breaks
    /// the one-index-entry-per-member rule.
    ///
    /// A missing bucket is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketNotFound`] if neither bucket exists.
    pub fn verify(&self, name: &str) -> Result<IndexReport> {
        let buckets = Buckets::new(name);
        let has_primary = self.tx.bucket_exists(&buckets.primary)?;
        let has_index = self.tx.bucket_exists(&buckets.index)?;
        if !has_primary && !has_index {
            return Err(Error::BucketNotFound(name.to_string()));
        }

        let mut report = IndexReport::default();

        if has_index {
            let mut cursor = self.tx.cursor(&buckets.index)?;
            let mut entry = cursor.seek_first()?;
            while let Some((composite, _)) = entry {
                report.index_entries += 1;
                match decode_index_key(&composite) {
                    Ok((score, member)) => {
                        let stored = if has_primary {
                            self.tx.get(&buckets.primary, member)?
                        } else {
                            None
                        };
                        match stored {
                            None => report.orphaned.push((member.to_vec(), score)),
                            Some(raw) if decode_score(&raw).ok() != Some(score) => {
                                report.stale.push((member.to_vec(), score));
                            }
                            Some(_) => {}
                        }
                    }
                    Err(_) => report.malformed.push(composite.clone()),
                }
                entry = cursor.next()?;
            }
        }

        if has_primary {
            let mut cursor = self.tx.cursor(&buckets.primary)?;
            let mut entry = cursor.seek_first()?;
            while let Some((member, raw)) = entry {
                report.members += 1;
                match decode_score(&raw) {
                    Ok(score) => {
                        let composite = encode_index_key(score, &member);
                        let indexed =
                            has_index && self.tx.get(&buckets.index, &composite)?.is_some();
                        if !indexed {
                            report.unindexed.push((member, score));
                        }
                    }
                    Err(_) => report.malformed.push(member),
                }
                entry = cursor.next()?;
            }
        }

        if !report.is_consistent() {
            warn!(
                collection = name,
                orphaned = report.orphaned.len(),
                stale = report.stale.len(),
                unindexed = report.unindexed.len(),
                malformed = report.malformed.len(),
                "sorted collection is inconsistent"
            );
        }
        Ok(report)
    }

    /// Current value of the collection's sequence counter, or 0 if the
    /// collection doesn't exist.
    ///
    /// The counter lives on the primary bucket.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub fn sequence(&self, name: &str) -> Result<u64> {
        let primary = sorted_primary_bucket(name);
        if !self.tx.bucket_exists(&primary)? {
            return Ok(0);
        }
        Ok(self.tx.sequence(&primary)?)
    }

    /// Overwrite the collection's sequence counter, creating the collection
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn set_sequence(&mut self, name: &str, value: u64) -> Result<()> {
        let buckets = self.create(name)?;
        self.tx.set_sequence(&buckets.primary, value)?;
        Ok(())
    }

    /// Advance the collection's sequence counter and return the new value,
    /// creating the collection if needed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the counter is exhausted or the write fails.
    pub fn next_sequence(&mut self, name: &str) -> Result<u64> {
        let buckets = self.create(name)?;
        Ok(self.tx.next_sequence(&buckets.primary)?)
    }

    /// Move `key` from `old` to `score`, keeping both buckets in step.
    fn rescore(
        &mut self,
        buckets: &Buckets,
        key: &[u8],
        old: Option<u64>,
        score: u64,
    ) -> Result<()> {
        if old == Some(score) {
            return Ok(());
        }

        self.tx.put(&buckets.index, &encode_index_key(score, key), &[])?;
        self.tx.put(&buckets.primary, key, &encode_score(score))?;
        if let Some(old) = old {
            self.tx.delete(&buckets.index, &encode_index_key(old, key))?;
        }

        trace!(key = %key.escape_ascii(), old = ?old, score, "rescored member");
        Ok(())
    }

    fn stored_score(&self, primary: &[u8], key: &[u8]) -> Result<Option<u64>> {
        match self.tx.get(primary, key)? {
            Some(raw) => Ok(Some(decode_score(&raw)?)),
            None => Ok(None),
        }
    }

    fn create(&mut self, name: &str) -> Result<Buckets> {
        let buckets = Buckets::new(name);
        let created = self.tx.create_bucket_if_not_exists(&buckets.primary)?;
        self.tx.create_bucket_if_not_exists(&buckets.index)?;
        if created {
            debug!(collection = name, "created sorted collection");
        }
        Ok(buckets)
    }

    fn require_index(&self, name: &str) -> Result<Vec<u8>> {
        let index = sorted_index_bucket(name);
        if !self.tx.bucket_exists(&index)? {
            return Err(Error::BucketNotFound(name.to_string()));
        }
        Ok(index)
    }
}

fn split_index_key(composite: &[u8]) -> Result<ScoredMember> {
    let (score, member) = decode_index_key(composite)?;
    Ok((member.to_vec(), score))
}

/// The outcome of [`SortedIndex::verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Entries in the primary bucket.
    pub members: usize,
    /// Entries in the index bucket.
    pub index_entries: usize,
    /// Index entries whose member has no score.
    pub orphaned: Vec<ScoredMember>,
    /// Index entries whose score differs from the member's stored score.
    pub stale: Vec<ScoredMember>,
    /// Members with no index entry at their stored score.
    pub unindexed: Vec<ScoredMember>,
    /// Raw keys whose index key or stored score could not be decoded.
    pub malformed: Vec<Vec<u8>>,
}

impl IndexReport {
    /// Returns `true` if the two buckets agree exactly.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.orphaned.is_empty()
            && self.stale.is_empty()
            && self.unindexed.is_empty()
            && self.malformed.is_empty()
            && self.members == self.index_entries
    }
}
