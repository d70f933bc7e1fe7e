//! Base-254 codec for arbitrary-width unsigned magnitudes.
//!
//! The input is read as a big-endian unsigned integer of any width. Leading
//! zero bytes carry no numeric weight, so each one is written as a single
//! `0x01` marker in front of the digits. The remaining magnitude is written in
//! base 254, most significant digit first, with every digit shifted up by two
//! so it lands in `0x02..=0xFF`.
//!
//! ```text
//! input:   00 00 | 01 02 04 06 ff
//! output:  01 01 | base-254 digits of 0x0102040604ff, each + 2
//! ```
//!
//! Bytes `0x00` and `0x01` never appear as digits. [`decode`] rejects them
//! rather than guessing, which keeps every accepted input unambiguous.
//!
//! The output does not sort numerically for inputs of different widths; use
//! [`super::score`] when byte order must follow numeric order.

use num_bigint::BigUint;

use crate::error::{CoreError, CoreResult};

/// Marker written once per stripped leading zero byte.
pub const ZERO_MARK: u8 = 0x01;

/// Smallest legal digit byte; digit `d` is stored as `d + DIGIT_OFFSET`.
pub const DIGIT_OFFSET: u8 = 0x02;

/// Number base of the digit sequence.
pub const RADIX: u32 = 254;

/// Encode a big-endian magnitude.
///
/// Empty input encodes to empty output. An all-zero input encodes to a run of
/// [`ZERO_MARK`] bytes with no digits.
#[must_use]
pub fn encode(src: &[u8]) -> Vec<u8> {
    let zeros = src.iter().take_while(|&&b| b == 0x00).count();
    let magnitude = &src[zeros..];

    let mut dst = Vec::with_capacity(zeros + magnitude.len() + 1);
    dst.resize(zeros, ZERO_MARK);
    if magnitude.is_empty() {
        return dst;
    }

    // The first magnitude byte is non-zero, so there is no leading zero digit.
    let number = BigUint::from_bytes_be(magnitude);
    dst.extend(number.to_radix_be(RADIX).into_iter().map(|digit| digit + DIGIT_OFFSET));
    dst
}

/// Decode bytes produced by [`encode`].
///
/// # Errors
///
/// Returns [`CoreError::MalformedEncoding`] if a byte after the leading
/// [`ZERO_MARK`] run is `0x00` or `0x01`.
pub fn decode(src: &[u8]) -> CoreResult<Vec<u8>> {
    let zeros = src.iter().take_while(|&&b| b == ZERO_MARK).count();
    let digits = &src[zeros..];

    let mut number = BigUint::default();
    for (i, &byte) in digits.iter().enumerate() {
        if byte < DIGIT_OFFSET {
            return Err(CoreError::MalformedEncoding { offset: zeros + i, byte });
        }
        number = number * RADIX + u32::from(byte - DIGIT_OFFSET);
    }

    let mut dst = vec![0x00; zeros];
    if number.bits() > 0 {
        dst.extend_from_slice(&number.to_bytes_be());
    }
    Ok(dst)
}
