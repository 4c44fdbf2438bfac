//! FASTA input and output
//!
//! Input files may be plain or compressed with any format `niffler` detects from
//! the content. Record names are the identifier part of the header line, up to the
//! first whitespace. Output is written with sequence lines wrapped to a fixed width.

use std::{
    io::{Read, Write},
    path::Path,
};

use log::debug;
use seq_io::fasta::{Reader, Record as _};

use crate::{Record, RecordSink, Result};

/// Default width of wrapped sequence lines
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// Reads every record of a (possibly compressed) FASTA file into memory
pub fn read_batch<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let (handle, format) = niffler::from_path(path.as_ref())?;
    debug!(
        "Reading {} ({format:?} compression)",
        path.as_ref().display()
    );
    read_batch_from(handle)
}

/// Reads every record of an uncompressed FASTA stream into memory
pub fn read_batch_from<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut reader = Reader::new(reader);
    let mut batch = Vec::new();
    while let Some(record) = reader.next() {
        let record = record?;
        let name = record.id()?.to_string();
        let sequence = String::from_utf8(record.full_seq().into_owned())?;
        batch.push(Record::new(name, sequence));
    }
    Ok(batch)
}

/// Writes records as FASTA with wrapped sequence lines
pub struct FastaWriter<W: Write> {
    inner: W,
    line_width: usize,
}
impl<W: Write> FastaWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    /// Sets the sequence line width, zero writes each sequence on a single line
    #[must_use]
    pub fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn line_width(&self) -> usize {
        self.line_width
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> RecordSink for FastaWriter<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        writeln!(self.inner, ">{}", record.name)?;
        let sequence = record.sequence.as_bytes();
        if self.line_width == 0 {
            if !sequence.is_empty() {
                self.inner.write_all(sequence)?;
                self.inner.write_all(b"\n")?;
            }
            return Ok(());
        }
        for line in sequence.chunks(self.line_width) {
            self.inner.write_all(line)?;
            self.inner.write_all(b"\n")?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_read_batch_from() -> Result<()> {
        let input = b">seqA first record\nACGT\nAC\n>seqB\nAANT\n";
        let batch = read_batch_from(Cursor::new(&input[..]))?;
        assert_eq!(
            batch,
            vec![Record::new("seqA", "ACGTAC"), Record::new("seqB", "AANT")]
        );
        Ok(())
    }

    #[test]
    fn test_read_empty() -> Result<()> {
        assert!(read_batch_from(Cursor::new(Vec::new()))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_wrapped_output() -> Result<()> {
        let mut writer = FastaWriter::new(Vec::new()).with_line_width(4);
        writer.write_record(&Record::new("seqA", "ACGTACGTAC"))?;
        writer.write_record(&Record::new("seqB", "ACGT"))?;
        writer.write_record(&Record::new("empty", ""))?;
        RecordSink::flush(&mut writer)?;
        let text = String::from_utf8(writer.into_inner())?;
        assert_eq!(text, ">seqA\nACGT\nACGT\nAC\n>seqB\nACGT\n>empty\n");
        Ok(())
    }

    #[test]
    fn test_unwrapped_output() -> Result<()> {
        let mut writer = FastaWriter::new(Vec::new()).with_line_width(0);
        writer.write_record(&Record::new("seqA", "ACGTACGTAC"))?;
        assert_eq!(writer.into_inner(), b">seqA\nACGTACGTAC\n");
        Ok(())
    }

    #[test]
    fn test_written_output_reads_back() -> Result<()> {
        let records = vec![
            Record::new("r1", "A".repeat(170)),
            Record::new("r2", "CGT"),
        ];
        let mut writer = FastaWriter::new(Vec::new());
        for record in &records {
            writer.write_record(record)?;
        }
        let bytes = writer.into_inner();
        assert_eq!(read_batch_from(Cursor::new(bytes))?, records);
        Ok(())
    }
}
