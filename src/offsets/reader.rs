use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use byteorder::{LittleEndian, ReadBytesExt};
use zstd::Decoder;

use super::OffsetHeader;
use crate::{error::OffsetFileError, mask::KeepMask, pipeline::OffsetEntry, Result};

/// Entry body of an offset file, decompressed on the fly when flagged
enum Body<R: Read> {
    Plain(R),
    Compressed(Decoder<'static, BufReader<R>>),
}
impl<R: Read> Read for Body<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(inner) => inner.read(buf),
            Self::Compressed(inner) => inner.read(buf),
        }
    }
}

/// Iterates over the entries of an offset file
///
/// Entries are yielded in file order, which is the order the collector received
/// them in. Iteration ends after the number of entries declared in the header, or
/// after the first error.
pub struct OffsetReader<R: Read> {
    header: OffsetHeader,
    body: Body<R>,
    read: u64,
    failed: bool,
}
impl<R: Read> OffsetReader<R> {
    pub fn new(mut inner: R) -> Result<Self> {
        let header = OffsetHeader::from_reader(&mut inner)?;
        let body = if header.compressed {
            Body::Compressed(Decoder::new(inner)?)
        } else {
            Body::Plain(inner)
        };
        Ok(Self {
            header,
            body,
            read: 0,
            failed: false,
        })
    }

    #[must_use]
    pub fn header(&self) -> OffsetHeader {
        self.header
    }

    /// Number of entries declared in the header
    #[must_use]
    pub fn num_records(&self) -> u64 {
        self.header.records
    }

    /// Scans the remaining entries for `name` and decodes its keep-mask
    ///
    /// Names are not required to be unique; the first match wins.
    pub fn find_mask(&mut self, name: &str) -> Result<Option<KeepMask>> {
        for entry in self.by_ref() {
            let entry = entry?;
            if entry.name == name {
                return entry.decode().map(Some);
            }
        }
        Ok(None)
    }

    fn read_entry(&mut self) -> Result<OffsetEntry> {
        let name_len = self.body.read_u32::<LittleEndian>()?;
        let name = String::from_utf8(self.read_sized(u64::from(name_len))?)?;

        let mask_len = self.body.read_u64::<LittleEndian>()?;
        let mask = self.read_sized(mask_len)?;
        Ok(OffsetEntry::new(name, mask))
    }

    /// Reads exactly `len` bytes, growing the buffer only as data arrives
    fn read_sized(&mut self, len: u64) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        (&mut self.body).take(len).read_to_end(&mut buffer)?;
        if buffer.len() as u64 != len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(buffer)
    }
}

impl OffsetReader<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map(BufReader::new)?;
        Self::new(file)
    }
}

impl<R: Read> Iterator for OffsetReader<R> {
    type Item = Result<OffsetEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.read == self.header.records {
            return None;
        }
        match self.read_entry() {
            Ok(entry) => {
                self.read += 1;
                Some(Ok(entry))
            }
            Err(crate::Error::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                self.failed = true;
                Some(Err(
                    OffsetFileError::Truncated(self.read, self.header.records).into()
                ))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
