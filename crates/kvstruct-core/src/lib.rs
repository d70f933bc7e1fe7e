//! `kvstruct` Core
//!
//! Pure byte layouts shared by the `kvstruct` data structures. Nothing in this
//! crate touches storage.
//!
//! # Overview
//!
//! - [`encoding::keys`] - bucket name tags and composite sorted-index keys
//! - [`encoding::score`] - fixed-width score encoding and checked counter steps
//! - [`encoding::b254`] - the base-254 codec for arbitrary-width magnitudes
//!
//! # Example
//!
//! ```
//! use kvstruct_core::encoding::{b254, keys, score};
//!
//! // Scores sort numerically when compared as bytes.
//! assert!(score::encode_score(5) < score::encode_score(10));
//!
//! // A composite index key splits back into its parts.
//! let key = keys::encode_index_key(20, b"alice");
//! assert_eq!(keys::decode_index_key(&key).unwrap(), (20, &b"alice"[..]));
//!
//! // The codec never emits the reserved digits 0x00 and 0x01 outside the zero prefix.
//! let encoded = b254::encode(&[0, 0, 1, 2, 4, 6, 255]);
//! assert_eq!(b254::decode(&encoded).unwrap(), vec![0, 0, 1, 2, 4, 6, 255]);
//! ```

pub mod encoding;
pub mod error;

pub use encoding::score::{apply_step, decode_score, encode_score, SCORE_MAX, SCORE_MIN};
pub use error::{CoreError, CoreResult};
