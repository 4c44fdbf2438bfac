use auto_impl::auto_impl;

use crate::{mask, mask::KeepMask, Result};

/// A named sequence, optionally carrying the encoded keep-mask of its reduction
///
/// Records entering the pipeline hold the original sequence and no mask. Executing
/// a job produces a fresh record holding the reduced sequence; the mask is only
/// present when offsets are tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Identifier of the record in its batch
    pub name: String,

    /// Original sequence before execution, reduced sequence after
    pub sequence: String,

    /// Encoded keep-mask over the original positions (see [`mask::encode`])
    pub mask: Option<Vec<u8>>,
}
impl Record {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            mask: None,
        }
    }

    pub fn with_mask(name: impl Into<String>, sequence: impl Into<String>, mask: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            mask: Some(mask),
        }
    }

    /// Returns the length of the sequence in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Decodes the keep-mask of this record, if any
    pub fn decode_mask(&self) -> Result<Option<KeepMask>> {
        match &self.mask {
            Some(bytes) => Ok(Some(mask::decode(bytes)?)),
            None => Ok(None),
        }
    }
}

/// Destination of the records emitted by the collector
#[auto_impl(&mut, Box)]
pub trait RecordSink {
    /// Consume a single output record
    fn write_record(&mut self, record: &Record) -> Result<()>;

    /// Called once after the last record of a run was written
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl RecordSink for Vec<Record> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}
