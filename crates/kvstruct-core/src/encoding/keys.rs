//! Bucket names and composite keys.
//!
//! # Bucket Names
//!
//! A collection name is namespaced by a one-byte tag so that collections of
//! different kinds can share a name without sharing a bucket:
//!
//! - `0x30` - Hash collection: `[0x30][name]`
//! - `0x1D` - Sorted-index primary bucket, member to score: `[0x1D][name]`
//! - `0x1F` - Sorted-index index bucket, score-ordered: `[0x1F][name]`
//!
//! # Index Keys
//!
//! The index bucket stores one empty-valued entry per member:
//!
//! ```text
//! [score: u64 big-endian][member key: bytes]
//! ```
//!
//! The score prefix has a fixed width, so the member key is everything after
//! byte eight and the bucket's byte order is score order, ties broken by the
//! member key.

use crate::encoding::score::{decode_score, encode_score, SCORE_WIDTH};
use crate::error::{CoreError, CoreResult};

/// Bucket tag for hash collections.
pub const TAG_HASH: u8 = 0x30;
/// Bucket tag for the member-to-score bucket of a sorted index.
pub const TAG_SORTED_PRIMARY: u8 = 0x1D;
/// Bucket tag for the score-ordered bucket of a sorted index.
pub const TAG_SORTED_INDEX: u8 = 0x1F;

/// The structure kinds that own buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKind {
    /// A flat key-value collection.
    Hash,
    /// The member-to-score half of a sorted index.
    SortedPrimary,
    /// The `(score, member)` half of a sorted index.
    SortedIndex,
}

impl BucketKind {
    /// The tag byte that prefixes bucket names of this kind.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Hash => TAG_HASH,
            Self::SortedPrimary => TAG_SORTED_PRIMARY,
            Self::SortedIndex => TAG_SORTED_INDEX,
        }
    }

    /// Build the bucket name for collection `name`.
    #[must_use]
    pub fn bucket_name(self, name: &str) -> Vec<u8> {
        let mut bucket = Vec::with_capacity(1 + name.len());
        bucket.push(self.tag());
        bucket.extend_from_slice(name.as_bytes());
        bucket
    }
}

/// Bucket name of hash collection `name`.
#[inline]
#[must_use]
pub fn hash_bucket(name: &str) -> Vec<u8> {
    BucketKind::Hash.bucket_name(name)
}

/// Bucket name holding member scores of sorted index `name`.
#[inline]
#[must_use]
pub fn sorted_primary_bucket(name: &str) -> Vec<u8> {
    BucketKind::SortedPrimary.bucket_name(name)
}

/// Bucket name holding the score-ordered entries of sorted index `name`.
#[inline]
#[must_use]
pub fn sorted_index_bucket(name: &str) -> Vec<u8> {
    BucketKind::SortedIndex.bucket_name(name)
}

/// Encode the index key for `member` at `score`.
#[must_use]
pub fn encode_index_key(score: u64, member: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(SCORE_WIDTH + member.len());
    key.extend_from_slice(&encode_score(score));
    key.extend_from_slice(member);
    key
}

/// Split an index key into its score and member key.
///
/// # Errors
///
/// Returns [`CoreError::TruncatedIndexKey`] if the key is shorter than the
/// score prefix.
pub fn decode_index_key(key: &[u8]) -> CoreResult<(u64, &[u8])> {
    if key.len() < SCORE_WIDTH {
        return Err(CoreError::TruncatedIndexKey(key.len()));
    }
    let (score, member) = key.split_at(SCORE_WIDTH);
    Ok((decode_score(score)?, member))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_never_alias() {
        let name = "x";
        let hash = hash_bucket(name);
        let primary = sorted_primary_bucket(name);
        let index = sorted_index_bucket(name);

        assert_ne!(hash, primary);
        assert_ne!(hash, index);
        assert_ne!(primary, index);
        assert_eq!(&hash[1..], b"x");
        assert_eq!(&primary[1..], b"x");
    }

    #[test]
    fn test_empty_collection_name() {
        assert_eq!(hash_bucket(""), vec![TAG_HASH]);
    }

    #[test]
    fn test_index_key_roundtrip() {
        let key = encode_index_key(10, b"alice");
        assert_eq!(key.len(), SCORE_WIDTH + 5);
        assert_eq!(decode_index_key(&key).unwrap(), (10, &b"alice"[..]));
    }

    #[test]
    fn test_index_key_empty_member() {
        let key = encode_index_key(7, b"");
        assert_eq!(decode_index_key(&key).unwrap(), (7, &b""[..]));
    }

    #[test]
    fn test_index_key_ordering() {
        // Score first, member second.
        let low = encode_index_key(5, b"zzz");
        let mid_a = encode_index_key(20, b"a");
        let mid_b = encode_index_key(20, b"b");
        let high = encode_index_key(256, b"");

        assert!(low < mid_a);
        assert!(mid_a < mid_b);
        assert!(mid_b < high);
    }

    #[test]
    fn test_truncated_index_key() {
        assert_eq!(decode_index_key(&[0, 1, 2]), Err(CoreError::TruncatedIndexKey(3)));
    }
}
