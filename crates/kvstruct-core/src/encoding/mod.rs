//! Byte encodings for bucket names, scores and opaque magnitudes.
//!
//! # Key Encoding
//!
//! Every collection maps to one or two buckets whose names start with a tag
//! byte identifying the structure kind, see [`keys`]. Sorted-index members are
//! stored under composite keys `[score: u64 BE][member key]`, so the natural
//! byte order of the index bucket is score-major, member-minor.
//!
//! # Score Encoding
//!
//! Scores are unsigned 64-bit integers written big-endian in exactly eight
//! bytes, see [`score`]. Counter steps are signed and checked against the
//! score bounds instead of wrapping.
//!
//! # Base-254 Codec
//!
//! [`b254`] turns an arbitrary big-endian magnitude into digits `0x02..=0xFF`
//! with a `0x01` run standing in for leading zero bytes.

pub mod b254;
pub mod keys;
pub mod score;
