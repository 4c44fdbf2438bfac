//! Draining the result queue
//!
//! Workers race, so outcomes arrive in completion order. The collector either
//! forwards them as they come ([`CollectMode::Streaming`], constant memory) or
//! restores batch order ([`CollectMode::Reordering`]).
//!
//! Reordering holds every output record until the result queue is exhausted:
//! with unordered completion, the first record of the batch may be the last to
//! finish, so nothing can be emitted safely before the drain ends. Memory is
//! therefore `O(N)` in the batch size, on top of the input batch the caller
//! already holds.

use crossbeam_channel::Receiver;

use super::pool::Outcome;
use crate::{
    error::PipelineError,
    mask::{self, KeepMask},
    progress::ProgressTracker,
    Record, RecordSink, Result,
};

/// How the collector emits records to its sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectMode {
    /// Emit each record on arrival
    #[default]
    Streaming,
    /// Buffer all records and emit them in batch order after the drain
    Reordering,
}

/// Encoded keep-mask of one record, as persisted in the offset artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetEntry {
    pub name: String,
    pub mask: Vec<u8>,
}
impl OffsetEntry {
    pub fn new(name: impl Into<String>, mask: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mask,
        }
    }

    /// Decodes the keep-mask of this entry
    pub fn decode(&self) -> Result<KeepMask> {
        Ok(mask::decode(&self.mask)?)
    }
}

/// What a completed run hands back to the caller
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Number of records written to the sink
    pub records: usize,

    /// Offset entries in arrival order, empty unless offsets were tracked
    pub offsets: Vec<OffsetEntry>,
}

/// Consumes outcomes until the result queue is closed and empty
pub struct Collector<S> {
    mode: CollectMode,
    track_offsets: bool,
    expected: usize,
    sink: S,
    progress: ProgressTracker,
}
impl<S: RecordSink> Collector<S> {
    /// Creates a collector expecting one outcome for each of `expected` jobs
    pub fn new(mode: CollectMode, track_offsets: bool, expected: usize, sink: S) -> Self {
        Self {
            mode,
            track_offsets,
            expected,
            sink,
            progress: ProgressTracker::new("Reduced records", expected as u64),
        }
    }

    #[must_use]
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress = self.progress.with_interval(interval);
        self
    }

    /// Drains the result queue
    ///
    /// Returns at the first failed outcome; records that were not emitted by then
    /// never reach the sink. Dropping the queue on return lets the remaining workers
    /// and the dispatcher wind down.
    pub fn drain(mut self, results: Receiver<Outcome>) -> Result<RunSummary> {
        let summary = match self.mode {
            CollectMode::Streaming => self.drain_streaming(&results)?,
            CollectMode::Reordering => self.drain_reordering(&results)?,
        };
        self.sink.flush()?;
        self.progress.finish();
        Ok(summary)
    }

    fn drain_streaming(&mut self, results: &Receiver<Outcome>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut received = 0;
        for outcome in results {
            received += 1;
            let mut record = outcome.result?;
            self.take_offsets(&mut record, &mut summary.offsets)?;
            self.sink.write_record(&record)?;
            summary.records += 1;
            self.progress.tick();
        }
        self.check_complete(received)?;
        Ok(summary)
    }

    fn drain_reordering(&mut self, results: &Receiver<Outcome>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut slots: Vec<Option<Record>> = vec![None; self.expected];
        let mut received = 0;
        for Outcome { serial, result } in results {
            received += 1;
            let mut record = result?;
            self.take_offsets(&mut record, &mut summary.offsets)?;
            if let Some(slot) = slots.get_mut(serial) {
                *slot = Some(record);
            }
            self.progress.tick();
        }
        self.check_complete(received)?;

        // nothing is emitted unless every slot is filled
        let filled = slots.iter().filter(|slot| slot.is_some()).count();
        if filled != self.expected {
            return Err(PipelineError::MissingOutcomes {
                expected: self.expected,
                received: filled,
            }
            .into());
        }
        for record in slots.into_iter().flatten() {
            self.sink.write_record(&record)?;
            summary.records += 1;
        }
        Ok(summary)
    }

    /// Moves the encoded mask of a record into the offset accumulator
    fn take_offsets(&self, record: &mut Record, offsets: &mut Vec<OffsetEntry>) -> Result<()> {
        if !self.track_offsets {
            return Ok(());
        }
        let Some(mask) = record.mask.take() else {
            return Err(PipelineError::MissingMask(record.name.clone()).into());
        };
        offsets.push(OffsetEntry::new(record.name.clone(), mask));
        Ok(())
    }

    fn check_complete(&self, received: usize) -> Result<()> {
        if received == self.expected {
            Ok(())
        } else {
            Err(PipelineError::MissingOutcomes {
                expected: self.expected,
                received,
            }
            .into())
        }
    }
}
