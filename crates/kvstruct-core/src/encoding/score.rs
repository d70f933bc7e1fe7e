//! Fixed-width score encoding and checked counter arithmetic.
//!
//! Scores are `u64` values written as eight big-endian bytes. Fixed width plus
//! big-endian byte order means comparing the encoded bytes compares the
//! numbers, which is what lets the sorted index use scores as key prefixes.
//!
//! Counters (hash increments and sorted-index increments) move by a signed
//! step and must stay inside `[SCORE_MIN, SCORE_MAX]`.

use crate::error::{CoreError, CoreResult};

/// Width of an encoded score in bytes.
pub const SCORE_WIDTH: usize = 8;

/// Smallest representable score.
pub const SCORE_MIN: u64 = u64::MIN;

/// Largest representable score.
pub const SCORE_MAX: u64 = u64::MAX;

/// Encode a score as eight big-endian bytes.
#[inline]
#[must_use]
pub const fn encode_score(score: u64) -> [u8; SCORE_WIDTH] {
    score.to_be_bytes()
}

/// Decode a score previously written by [`encode_score`].
///
/// # Errors
///
/// Returns [`CoreError::InvalidScore`] unless `raw` is exactly eight bytes.
#[inline]
pub fn decode_score(raw: &[u8]) -> CoreResult<u64> {
    let bytes: [u8; SCORE_WIDTH] = raw
        .try_into()
        .map_err(|_| CoreError::InvalidScore { expected: SCORE_WIDTH, actual: raw.len() })?;
    Ok(u64::from_be_bytes(bytes))
}

/// Apply a signed step to a counter.
///
/// A positive step adds, a negative step subtracts its magnitude, zero leaves
/// the value unchanged. The magnitude of any `i64` fits in a `u64`, so the step
/// itself never wraps. The score bounds are the bounds of `u64`, so checked
/// arithmetic is the bound check.
///
/// # Errors
///
/// Returns [`CoreError::Overflow`] if the result would exceed [`SCORE_MAX`] and
/// [`CoreError::Underflow`] if it would drop below [`SCORE_MIN`].
pub fn apply_step(current: u64, step: i64) -> CoreResult<u64> {
    let magnitude = step.unsigned_abs();
    if step >= 0 {
        current.checked_add(magnitude).ok_or(CoreError::Overflow { current, step })
    } else {
        current.checked_sub(magnitude).ok_or(CoreError::Underflow { current, step })
    }
}
