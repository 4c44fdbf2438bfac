//! Byte layout of encoded keep-masks
//!
//! An encoded mask is a [`MaskHeader`] followed by the packed words of the mask.
//! See the [module documentation](crate::mask) for the table of fields.

use byteorder::{ByteOrder, LittleEndian};

use super::KeepMask;
use crate::error::{CodecError, PayloadError};

/// Current magic number: "KMSK" in ASCII (in little-endian byte order)
#[allow(clippy::unreadable_literal)]
const MAGIC: u32 = 0x4B534D4B;

/// Current format version of the encoded mask
///
/// Consumers of offset artifacts rely on this layout; bump on any change.
const FORMAT: u8 = 1;

/// Size of the mask header in bytes
pub const SIZE_MASK_HEADER: usize = 32;

/// Reserved bytes in the header
pub const RESERVED: [u8; 11] = [42; 11];

/// Header preceding the packed words of an encoded mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskHeader {
    /// Magic number to identify an encoded mask
    ///
    /// 4 bytes
    pub magic: u32,

    /// Version of the encoding
    ///
    /// 1 byte
    pub format: u8,

    /// Number of original positions
    ///
    /// 8 bytes
    pub positions: u64,

    /// Number of kept positions
    ///
    /// 8 bytes
    pub kept: u64,

    /// Reserve remaining bytes for future use
    ///
    /// 11 bytes
    pub reserved: [u8; 11],
}
impl MaskHeader {
    /// Creates a header describing `mask`
    #[must_use]
    pub fn new(mask: &KeepMask) -> Self {
        Self {
            magic: MAGIC,
            format: FORMAT,
            positions: mask.len() as u64,
            kept: mask.count_ones() as u64,
            reserved: RESERVED,
        }
    }

    /// Number of payload bytes that follow this header
    #[must_use]
    pub fn payload_size(&self) -> usize {
        (self.positions as usize).div_ceil(64) * 8
    }

    /// Parses a header from a fixed-size byte array
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The magic number is incorrect
    /// * The format version is unsupported
    /// * The reserved bytes are not the expected placeholder values
    pub fn from_bytes(buffer: &[u8; SIZE_MASK_HEADER]) -> Result<Self, PayloadError> {
        let magic = LittleEndian::read_u32(&buffer[0..4]);
        if magic != MAGIC {
            return Err(PayloadError::InvalidMagicNumber(magic));
        }
        let format = buffer[4];
        if format != FORMAT {
            return Err(PayloadError::InvalidFormatVersion(format));
        }
        let positions = LittleEndian::read_u64(&buffer[5..13]);
        let kept = LittleEndian::read_u64(&buffer[13..21]);
        let Ok(reserved) = <[u8; 11]>::try_from(&buffer[21..32]) else {
            return Err(PayloadError::InvalidReservedBytes);
        };
        if reserved != RESERVED {
            return Err(PayloadError::InvalidReservedBytes);
        }
        Ok(Self {
            magic,
            format,
            positions,
            kept,
            reserved,
        })
    }

    /// Parses a header from the start of an arbitrarily sized buffer
    pub fn from_buffer(buffer: &[u8]) -> Result<Self, PayloadError> {
        let mut bytes = [0u8; SIZE_MASK_HEADER];
        if buffer.len() < SIZE_MASK_HEADER {
            return Err(PayloadError::TruncatedHeader(
                buffer.len(),
                SIZE_MASK_HEADER,
            ));
        }
        bytes.copy_from_slice(&buffer[..SIZE_MASK_HEADER]);
        Self::from_bytes(&bytes)
    }

    /// Serializes the header into the first `SIZE_MASK_HEADER` bytes of `buffer`
    fn write_into(&self, buffer: &mut [u8]) {
        LittleEndian::write_u32(&mut buffer[0..4], self.magic);
        buffer[4] = self.format;
        LittleEndian::write_u64(&mut buffer[5..13], self.positions);
        LittleEndian::write_u64(&mut buffer[13..21], self.kept);
        buffer[21..32].copy_from_slice(&self.reserved);
    }
}

/// Encodes a keep-mask into its versioned byte layout
///
/// The output is `32 + 8 * ceil(n / 64)` bytes for a mask of `n` positions; the
/// empty mask encodes to the header alone.
#[must_use]
pub fn encode(mask: &KeepMask) -> Vec<u8> {
    let header = MaskHeader::new(mask);
    let mut buffer = vec![0u8; SIZE_MASK_HEADER + header.payload_size()];
    header.write_into(&mut buffer);
    LittleEndian::write_u64_into(mask.words(), &mut buffer[SIZE_MASK_HEADER..]);
    buffer
}

/// Decodes a keep-mask previously produced by [`encode`]
pub fn decode(bytes: &[u8]) -> Result<KeepMask, CodecError> {
    let header = MaskHeader::from_buffer(bytes)?;
    let payload = &bytes[SIZE_MASK_HEADER..];

    let Ok(positions) = usize::try_from(header.positions) else {
        return Err(PayloadError::InvalidSize(payload.len(), usize::MAX).into());
    };
    let expected = positions.div_ceil(64) * 8;
    if payload.len() != expected {
        return Err(PayloadError::InvalidSize(payload.len(), expected).into());
    }

    let mut words = vec![0u64; payload.len() / 8];
    LittleEndian::read_u64_into(payload, &mut words);

    let tail = positions % 64;
    if tail != 0 && words.last().is_some_and(|&last| last >> tail != 0) {
        return Err(PayloadError::DirtyPadding.into());
    }

    let mask = KeepMask::from_words(words, positions);
    if mask.count_ones() as u64 != header.kept {
        return Err(PayloadError::InconsistentKept {
            declared: header.kept,
            counted: mask.count_ones(),
        }
        .into());
    }
    Ok(mask)
}

#[cfg(test)]
mod testing {
    use super::*;
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    fn payload_error(bytes: &[u8]) -> PayloadError {
        match decode(bytes) {
            Err(CodecError::MalformedPayload(err)) => err,
            other => panic!("expected a malformed payload, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_edge_masks() -> Result<(), CodecError> {
        let empty = KeepMask::new();
        let all_kept: KeepMask = std::iter::repeat_n(true, 130).collect();
        let all_deleted: KeepMask = std::iter::repeat_n(false, 130).collect();
        for mask in [empty, all_kept, all_deleted] {
            assert_eq!(decode(&encode(&mask))?, mask);
        }
        Ok(())
    }

    #[test]
    fn test_round_trip_random_masks() -> Result<(), CodecError> {
        let mut rng = SmallRng::seed_from_u64(42);
        for len in [1, 7, 64, 100, 512, 1025, 10_000] {
            let mask: KeepMask = (0..len).map(|_| rng.random_bool(0.8)).collect();
            let decoded = decode(&encode(&mask))?;
            assert_eq!(decoded, mask);
            assert_eq!(decoded.rank(len - 1)?, mask.count_ones());
        }
        Ok(())
    }

    #[test]
    fn test_empty_mask_is_header_only() {
        let bytes = encode(&KeepMask::new());
        assert_eq!(bytes.len(), SIZE_MASK_HEADER);
        let header = MaskHeader::from_buffer(&bytes).unwrap();
        assert_eq!(header.positions, 0);
        assert_eq!(header.kept, 0);
    }

    #[test]
    fn test_encoded_size() {
        let mask: KeepMask = std::iter::repeat_n(true, 65).collect();
        assert_eq!(encode(&mask).len(), SIZE_MASK_HEADER + 16);
    }

    #[test]
    fn test_deterministic() {
        let mask: KeepMask = [true, false, true].into_iter().collect();
        assert_eq!(encode(&mask), encode(&mask.clone()));
    }

    #[test]
    fn test_truncated_header() {
        assert_eq!(
            payload_error(&[0u8; 10]),
            PayloadError::TruncatedHeader(10, SIZE_MASK_HEADER)
        );
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = encode(&KeepMask::new());
        bytes[0] = b'X';
        assert!(matches!(
            payload_error(&bytes),
            PayloadError::InvalidMagicNumber(_)
        ));
    }

    #[test]
    fn test_invalid_format() {
        let mut bytes = encode(&KeepMask::new());
        bytes[4] = 9;
        assert_eq!(payload_error(&bytes), PayloadError::InvalidFormatVersion(9));
    }

    #[test]
    fn test_invalid_reserved() {
        let mut bytes = encode(&KeepMask::new());
        bytes[SIZE_MASK_HEADER - 1] = 0;
        assert_eq!(payload_error(&bytes), PayloadError::InvalidReservedBytes);
    }

    #[test]
    fn test_size_mismatch() {
        let mask: KeepMask = std::iter::repeat_n(true, 70).collect();
        let mut bytes = encode(&mask);
        bytes.truncate(bytes.len() - 8);
        assert_eq!(
            payload_error(&bytes),
            PayloadError::InvalidSize(8, 16)
        );
    }

    #[test]
    fn test_dirty_padding() {
        let mask: KeepMask = [true, true, false].into_iter().collect();
        let mut bytes = encode(&mask);
        bytes[SIZE_MASK_HEADER] |= 0b1000;
        assert_eq!(payload_error(&bytes), PayloadError::DirtyPadding);
    }

    #[test]
    fn test_inconsistent_kept() {
        let mask: KeepMask = [true, true, false].into_iter().collect();
        let mut bytes = encode(&mask);
        LittleEndian::write_u64(&mut bytes[13..21], 3);
        assert_eq!(
            payload_error(&bytes),
            PayloadError::InconsistentKept {
                declared: 3,
                counted: 2
            }
        );
    }
}
