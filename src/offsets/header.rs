use std::io::{Read, Write};

use byteorder::{ByteOrder, LittleEndian};

use crate::{error::OffsetFileError, Result};

/// Current magic number: "KOFS" in ASCII (in little-endian byte order)
#[allow(clippy::unreadable_literal)]
const MAGIC: u32 = 0x53464F4B;

/// Current format version of the offset file
const FORMAT: u8 = 1;

/// Size of the offset file header in bytes
pub const SIZE_OFFSET_HEADER: usize = 32;

/// Reserved bytes in the header
pub const RESERVED: [u8; 18] = [42; 18];

/// Header at the start of an offset file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetHeader {
    /// Magic number to identify the file format
    ///
    /// 4 bytes
    pub magic: u32,

    /// Version of the file format
    ///
    /// 1 byte
    pub format: u8,

    /// Whether the entries following the header are zstd-compressed
    ///
    /// 1 byte
    pub compressed: bool,

    /// Number of entries in the file
    ///
    /// 8 bytes
    pub records: u64,

    /// Reserve remaining bytes for future use
    ///
    /// 18 bytes
    pub reserved: [u8; 18],
}
impl OffsetHeader {
    #[must_use]
    pub fn new(records: u64, compressed: bool) -> Self {
        Self {
            magic: MAGIC,
            format: FORMAT,
            compressed,
            records,
            reserved: RESERVED,
        }
    }

    /// Parses a header from a fixed-size byte array
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The magic number is incorrect
    /// * The format version is unsupported
    /// * The compression flag is neither 0 nor 1
    /// * The reserved bytes are not the expected placeholder values
    pub fn from_bytes(buffer: &[u8; SIZE_OFFSET_HEADER]) -> Result<Self> {
        let magic = LittleEndian::read_u32(&buffer[0..4]);
        if magic != MAGIC {
            return Err(OffsetFileError::InvalidMagicNumber(magic).into());
        }
        let format = buffer[4];
        if format != FORMAT {
            return Err(OffsetFileError::InvalidFormatVersion(format).into());
        }
        let compressed = match buffer[5] {
            0 => false,
            1 => true,
            flag => return Err(OffsetFileError::InvalidCompressionFlag(flag).into()),
        };
        let records = LittleEndian::read_u64(&buffer[6..14]);
        let Ok(reserved) = <[u8; 18]>::try_from(&buffer[14..32]) else {
            return Err(OffsetFileError::InvalidReservedBytes.into());
        };
        if reserved != RESERVED {
            return Err(OffsetFileError::InvalidReservedBytes.into());
        }
        Ok(Self {
            magic,
            format,
            compressed,
            records,
            reserved,
        })
    }

    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut buffer = [0u8; SIZE_OFFSET_HEADER];
        LittleEndian::write_u32(&mut buffer[0..4], self.magic);
        buffer[4] = self.format;
        buffer[5] = u8::from(self.compressed);
        LittleEndian::write_u64(&mut buffer[6..14], self.records);
        buffer[14..32].copy_from_slice(&self.reserved);
        writer.write_all(&buffer)?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buffer = [0u8; SIZE_OFFSET_HEADER];
        reader.read_exact(&mut buffer)?;
        Self::from_bytes(&buffer)
    }
}
