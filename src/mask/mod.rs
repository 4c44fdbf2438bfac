//! # mask
//!
//! Keep-masks record, for every position of an original sequence, whether that
//! position survives into the reduced sequence. They are the coordinate map between
//! original and reduced sequences.
//!
//! A [`KeepMask`] stores one bit per position packed into `u64` words, plus a rank
//! directory with the number of kept positions preceding every 512-bit block. This
//! keeps the mask at `n` bits plus `n / 512` counters instead of one integer per
//! position, while answering [`rank`](KeepMask::rank) with at most eight popcounts
//! and [`select`](KeepMask::select) with a binary search over the directory.
//!
//! ## Usage
//!
//! ```rust
//! use seqreduce::mask::{decode, encode, KeepMask};
//!
//! // ACNGT -> ACGT
//! let mask: KeepMask = [true, true, false, true, true].into_iter().collect();
//!
//! // Original position 3 ('G') is the third kept position
//! assert_eq!(mask.rank(3).unwrap(), 3);
//! assert_eq!(mask.translate(3), Some(2));
//! assert_eq!(mask.translate(2), None);
//!
//! // The third kept position sits at original position 3
//! assert_eq!(mask.select(3).unwrap(), 3);
//!
//! let bytes = encode(&mask);
//! assert_eq!(decode(&bytes).unwrap(), mask);
//! ```
//!
//! ## Encoded format
//!
//! An encoded mask is a fixed-size header followed by the packed words.
//!
//! ### Header Format (32 bytes total)
//!
//! | Offset | Size (bytes) | Name      | Description                   | Type   |
//! | ------ | ------------ | --------- | ----------------------------- | ------ |
//! | 0      | 4            | magic     | Magic number (0x4B534D4B)     | uint32 |
//! | 4      | 1            | format    | Format version (currently 1)  | uint8  |
//! | 5      | 8            | positions | Number of original positions  | uint64 |
//! | 13     | 8            | kept      | Number of kept positions      | uint64 |
//! | 21     | 11           | reserved  | Reserved for future use       | bytes  |
//!
//! ### Payload
//!
//! `ceil(positions / 64)` little-endian `u64` words. Position `i` is bit `i % 64`
//! of word `i / 64`. Bits past the last position are zero. The rank directory is
//! not stored; it is rebuilt on decode in a single pass over the words.
//!
//! ## Validation
//!
//! Decoding verifies:
//!
//! 1. Correct magic number
//! 2. Compatible version number
//! 3. Untouched reserved bytes
//! 4. Payload size matches the declared number of positions
//! 5. Zero padding bits
//! 6. Declared kept count matches the payload

mod bitvec;
mod codec;

pub use bitvec::{KeepMask, BLOCK_BITS};
pub use codec::{decode, encode, MaskHeader, SIZE_MASK_HEADER};
