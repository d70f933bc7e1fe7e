//! Redb table definitions and key encoding utilities.
//!
//! Redb tables are declared with string names, while buckets are addressed by
//! arbitrary byte strings. Instead of one redb table per bucket, every bucket
//! lives in a single physical data table under a prefix:
//!
//! ```text
//! [bucket name length: u32 big-endian][bucket name][key]
//! ```
//!
//! The length prefix keeps bucket names containing any byte value apart, and
//! all keys of one bucket stay adjacent and in key order. Bucket existence and
//! sequence counters live in a separate registry table.

use redb::TableDefinition;

/// The physical table that stores all key-value pairs.
pub const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> =
    TableDefinition::new("kvstruct_data");

/// The registry of existing buckets, mapping bucket name to sequence counter.
pub const BUCKETS_TABLE: TableDefinition<'static, &[u8], u64> =
    TableDefinition::new("kvstruct_buckets");

/// Width of the bucket name length prefix.
const LEN_WIDTH: usize = 4;

/// Encode a bucket name and key into a physical key.
#[must_use]
pub fn encode_key(bucket: &[u8], key: &[u8]) -> Vec<u8> {
    let mut encoded = bucket_prefix(bucket);
    encoded.extend_from_slice(key);
    encoded
}

/// Decode a physical key into its bucket name and original key.
///
/// Returns `None` if the key is malformed (truncated prefix).
#[must_use]
pub fn decode_key(encoded: &[u8]) -> Option<(&[u8], &[u8])> {
    let len_bytes: [u8; LEN_WIDTH] = encoded.get(..LEN_WIDTH)?.try_into().ok()?;
    let len = usize::try_from(u32::from_be_bytes(len_bytes)).ok()?;
    let rest = &encoded[LEN_WIDTH..];
    if rest.len() < len {
        return None;
    }
    Some(rest.split_at(len))
}

/// The prefix shared by every physical key of a bucket.
///
/// This is also the smallest physical key of the bucket. Names longer than
/// `u32::MAX` bytes cannot be stored by redb in the first place.
#[must_use]
pub fn bucket_prefix(bucket: &[u8]) -> Vec<u8> {
    let len = u32::try_from(bucket.len()).unwrap_or(u32::MAX);
    let mut prefix = Vec::with_capacity(LEN_WIDTH + bucket.len());
    prefix.extend_from_slice(&len.to_be_bytes());
    prefix.extend_from_slice(bucket);
    prefix
}

/// The first physical key that does NOT belong to the bucket.
///
/// Returns `None` when no such key exists, meaning the bucket extends to the
/// end of the keyspace.
#[must_use]
pub fn bucket_end_key(bucket: &[u8]) -> Option<Vec<u8>> {
    let mut end = bucket_prefix(bucket);
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_key() {
        let encoded = encode_key(b"users", b"user:123");

        let (bucket, key) = decode_key(&encoded).unwrap();
        assert_eq!(bucket, b"users");
        assert_eq!(key, b"user:123");
    }

    #[test]
    fn test_encode_decode_empty_key() {
        let encoded = encode_key(b"config", b"");

        let (bucket, key) = decode_key(&encoded).unwrap();
        assert_eq!(bucket, b"config");
        assert_eq!(key, b"");
    }

    #[test]
    fn test_binary_bucket_names() {
        // A bucket name that is a prefix of another, with a zero byte in between.
        let a = encode_key(b"\x1fab", b"\x00c");
        let b = encode_key(b"\x1fab\x00", b"c");
        assert_ne!(a, b);
        assert_eq!(decode_key(&a).unwrap(), (&b"\x1fab"[..], &b"\x00c"[..]));
        assert_eq!(decode_key(&b).unwrap(), (&b"\x1fab\x00"[..], &b"c"[..]));
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(decode_key(&[0, 0]), None);
        assert_eq!(decode_key(&[0, 0, 0, 5, b'a']), None);
    }

    #[test]
    fn test_key_ordering() {
        let key_a = encode_key(b"users", b"a");
        let key_b = encode_key(b"users", b"b");
        let key_ff = encode_key(b"users", &[0xFF, 0xFF]);

        assert!(key_a < key_b);
        assert!(key_b < key_ff);
    }

    #[test]
    fn test_bucket_range_keys() {
        let start = bucket_prefix(b"users");
        let end = bucket_end_key(b"users").unwrap();

        let inside = encode_key(b"users", &[0xFF; 16]);
        assert!(inside.as_slice() >= start.as_slice());
        assert!(inside.as_slice() < end.as_slice());

        for other in [&b"user"[..], &b"usersx"[..], &b"zother"[..], &b""[..]] {
            let outside = encode_key(other, b"test");
            assert!(outside < start || outside >= end);
        }
    }

    #[test]
    fn test_bucket_end_key_carries() {
        assert_eq!(bucket_end_key(&[0xFF]), Some(vec![0, 0, 0, 2]));
        assert_eq!(bucket_end_key(&[0x01, 0xFF]), Some(vec![0, 0, 0, 2, 0x02]));
    }
}
