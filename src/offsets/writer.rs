use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use byteorder::{LittleEndian, WriteBytesExt};
use log::debug;
use zstd::Encoder as ZstdEncoder;

use super::OffsetHeader;
use crate::{error::OffsetFileError, pipeline::OffsetEntry, Result};

/// Compression level of the entry body (zstd default)
const COMPRESSION_LEVEL: i32 = 0;

/// Writes a complete offset file: the header, then every entry in the given order
pub fn write_offsets<W: Write>(
    writer: &mut W,
    entries: &[OffsetEntry],
    compressed: bool,
) -> Result<()> {
    let header = OffsetHeader::new(entries.len() as u64, compressed);
    header.write_bytes(writer)?;
    if compressed {
        let mut encoder = ZstdEncoder::new(writer, COMPRESSION_LEVEL)?;
        write_entries(&mut encoder, entries)?;
        encoder.finish()?;
    } else {
        write_entries(writer, entries)?;
    }
    Ok(())
}

/// Writes a complete offset file to `path`
pub fn write_offsets_to_path<P: AsRef<Path>>(
    path: P,
    entries: &[OffsetEntry],
    compressed: bool,
) -> Result<()> {
    let mut writer = File::create(path.as_ref()).map(BufWriter::new)?;
    write_offsets(&mut writer, entries, compressed)?;
    writer.flush()?;
    debug!(
        "Wrote {} offset entries to {}",
        entries.len(),
        path.as_ref().display()
    );
    Ok(())
}

fn write_entries<W: Write>(writer: &mut W, entries: &[OffsetEntry]) -> Result<()> {
    for entry in entries {
        let name_len = u32::try_from(entry.name.len())
            .map_err(|_| OffsetFileError::NameTooLong(entry.name.len()))?;
        writer.write_u32::<LittleEndian>(name_len)?;
        writer.write_all(entry.name.as_bytes())?;
        writer.write_u64::<LittleEndian>(entry.mask.len() as u64)?;
        writer.write_all(&entry.mask)?;
    }
    Ok(())
}
