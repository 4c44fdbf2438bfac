//! # offsets
//!
//! The offset file persists the keep-mask of every reduced record so coordinates
//! can be translated between original and reduced sequences after the run.
//!
//! ## File layout
//!
//! A 32-byte [`OffsetHeader`] followed by one entry per record:
//!
//! | Offset | Size | Field      | Description                          |
//! | ------ | ---- | ---------- | ------------------------------------ |
//! | 0      | 4    | magic      | `"KOFS"`                             |
//! | 4      | 1    | format     | format version, currently 1          |
//! | 5      | 1    | compressed | 1 if the entries are zstd-compressed |
//! | 6      | 8    | records    | number of entries                    |
//! | 14     | 18   | reserved   | `[42; 18]`                           |
//!
//! Each entry is a little-endian `u32` name length, the UTF-8 name, a `u64` mask
//! length and the encoded mask (see [`crate::mask`]). When the compression flag is
//! set, everything after the header is a single zstd frame.
//!
//! ```rust
//! use seqreduce::mask::{encode, KeepMask};
//! use seqreduce::offsets::{write_offsets, OffsetReader};
//! use seqreduce::OffsetEntry;
//!
//! let keep: KeepMask = [true, true, false, true].into_iter().collect();
//! let entries = vec![OffsetEntry::new("seqB", encode(&keep))];
//!
//! let mut buffer = Vec::new();
//! write_offsets(&mut buffer, &entries, true).unwrap();
//!
//! let mut reader = OffsetReader::new(buffer.as_slice()).unwrap();
//! let mask = reader.find_mask("seqB").unwrap().unwrap();
//! assert_eq!(mask.translate(3), Some(2));
//! ```

mod header;
mod reader;
mod writer;

pub use header::{OffsetHeader, SIZE_OFFSET_HEADER};
pub use reader::OffsetReader;
pub use writer::{write_offsets, write_offsets_to_path};
