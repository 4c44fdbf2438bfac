//! # pipeline
//!
//! Parallel execution of one job per record.
//!
//! ```text
//!  batch ─► Dispatcher ─► work queue (T) ─► T workers ─► result queue (T) ─► Collector ─► sink
//!                                                                               │
//!                                                                               └─► offsets
//! ```
//!
//! The dispatcher and the supervisor of the worker pool run on their own threads;
//! the collector runs on the calling thread. The two bounded queues are the only
//! state shared between threads. Sends block when a queue is full, receives block
//! when it is empty, and the result queue is closed only after every worker has
//! been joined, so an empty result queue never ends a run early.
//!
//! Every dispatched job yields exactly one [`Outcome`]. Failed outcomes are
//! returned to the caller as they arrive and end the run; a missing outcome is a
//! [`PipelineError::MissingOutcomes`](crate::PipelineError::MissingOutcomes).
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use seqreduce::{PipelineBuilder, Record, Reduction};
//!
//! let batch = vec![Record::new("seqA", "ACGT"), Record::new("seqB", "AANT")];
//! let pipeline = PipelineBuilder::default()
//!     .pool_size(2)
//!     .track_offsets(true)
//!     .preserve_order(true)
//!     .build()
//!     .unwrap();
//!
//! let mut output = Vec::new();
//! let summary = pipeline
//!     .run(batch, Arc::new(Reduction::nucleotides()), &mut output)
//!     .unwrap();
//!
//! assert_eq!(output[1].sequence, "AAT");
//! assert_eq!(summary.offsets.len(), 2);
//! ```

mod collect;
mod dispatch;
mod pool;

use std::sync::Arc;

use crossbeam_channel::bounded;
use log::{debug, info};

pub use collect::{CollectMode, Collector, OffsetEntry, RunSummary};
pub use dispatch::{Dispatcher, JobBatch};
pub use pool::{Outcome, Ticket, WorkerPool};

use crate::{
    error::{ConfigError, PipelineError},
    job::{Job, MaskedTransform, NoOffsetJob, Transform, WithOffsetJob},
    progress::DEFAULT_INTERVAL,
    Record, RecordSink, Result,
};

/// Builder for configured [`Pipeline`] instances
///
/// # Examples
///
/// ```
/// # use seqreduce::{PipelineBuilder, Result};
/// # fn main() -> Result<()> {
/// let pipeline = PipelineBuilder::default()
///     .pool_size(4)
///     .preserve_order(true)
///     .build()?;
/// assert_eq!(pipeline.pool_size(), 4);
/// assert!(!pipeline.track_offsets());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineBuilder {
    /// Number of workers (defaults to 1)
    pool_size: Option<usize>,
    /// Whether jobs compute and encode keep-masks
    track_offsets: Option<bool>,
    /// Whether output follows batch order
    preserve_order: Option<bool>,
    /// Records between two progress messages, zero disables them
    progress_interval: Option<u64>,
}
impl PipelineBuilder {
    #[must_use]
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    #[must_use]
    pub fn track_offsets(mut self, track_offsets: bool) -> Self {
        self.track_offsets = Some(track_offsets);
        self
    }

    #[must_use]
    pub fn preserve_order(mut self, preserve_order: bool) -> Self {
        self.preserve_order = Some(preserve_order);
        self
    }

    #[must_use]
    pub fn progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let pool_size = self.pool_size.unwrap_or(1);
        if pool_size == 0 {
            return Err(ConfigError::InvalidPoolSize(pool_size).into());
        }
        Ok(Pipeline {
            pool_size,
            track_offsets: self.track_offsets.unwrap_or(false),
            preserve_order: self.preserve_order.unwrap_or(false),
            progress_interval: self.progress_interval.unwrap_or(DEFAULT_INTERVAL),
        })
    }
}

/// A configured dispatcher / worker pool / collector run
///
/// The pool size is fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    pool_size: usize,
    track_offsets: bool,
    preserve_order: bool,
    progress_interval: u64,
}
impl Pipeline {
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    #[must_use]
    pub fn track_offsets(&self) -> bool {
        self.track_offsets
    }

    #[must_use]
    pub fn preserve_order(&self) -> bool {
        self.preserve_order
    }

    #[must_use]
    pub fn collect_mode(&self) -> CollectMode {
        if self.preserve_order {
            CollectMode::Reordering
        } else {
            CollectMode::Streaming
        }
    }

    /// Transforms every record of `batch` and writes the results to `sink`
    ///
    /// Builds jobs with or without offset tracking according to the configuration,
    /// then runs them through [`Pipeline::run_jobs`]. Transforms that implement only
    /// one of the two traits, such as closures, go through [`Pipeline::run_plain`]
    /// or [`Pipeline::run_masked`].
    pub fn run<T, S>(&self, batch: Vec<Record>, transform: Arc<T>, sink: S) -> Result<RunSummary>
    where
        T: Transform + MaskedTransform + ?Sized + 'static,
        S: RecordSink,
    {
        match JobBatch::new(batch, self.track_offsets, transform) {
            JobBatch::NoOffset(jobs) => self.run_jobs(jobs, sink),
            JobBatch::WithOffset(jobs) => self.run_jobs(jobs, sink),
        }
    }

    /// Runs `transform` over every record without tracking offsets
    ///
    /// Accepts any [`Transform`], including closures returning a `String`. The
    /// `track_offsets` setting is ignored and the summary carries no offsets.
    pub fn run_plain<T, S>(
        &self,
        batch: Vec<Record>,
        transform: Arc<T>,
        sink: S,
    ) -> Result<RunSummary>
    where
        T: Transform + ?Sized + 'static,
        S: RecordSink,
    {
        let jobs = batch
            .into_iter()
            .map(|record| NoOffsetJob::new(record, Arc::clone(&transform)))
            .collect();
        self.run_jobs(jobs, sink)
    }

    /// Runs `transform` over every record and collects the encoded keep-masks
    ///
    /// Accepts any [`MaskedTransform`], including closures returning a sequence and
    /// its [`KeepMask`](crate::mask::KeepMask). Offsets are tracked whatever the
    /// `track_offsets` setting.
    pub fn run_masked<T, S>(
        &self,
        batch: Vec<Record>,
        transform: Arc<T>,
        sink: S,
    ) -> Result<RunSummary>
    where
        T: MaskedTransform + ?Sized + 'static,
        S: RecordSink,
    {
        let jobs = batch
            .into_iter()
            .map(|record| WithOffsetJob::new(record, Arc::clone(&transform)))
            .collect();
        self.run_jobs(jobs, sink)
    }

    /// Runs prebuilt jobs through the pool and collects their outcomes into `sink`
    ///
    /// Offsets are accumulated when the job type tracks them, regardless of the
    /// `track_offsets` setting used by [`Pipeline::run`].
    ///
    /// The collector's error wins over thread failures. A job that panics leaves
    /// its outcome missing, so the run fails with
    /// [`PipelineError::MissingOutcomes`] while the panic itself is only logged.
    pub fn run_jobs<J, S>(&self, jobs: Vec<J>, sink: S) -> Result<RunSummary>
    where
        J: Job,
        S: RecordSink,
    {
        let expected = jobs.len();
        info!(
            "Reducing {expected} records with {} worker(s) (offsets: {}, preserve order: {})",
            self.pool_size,
            J::TRACKS_OFFSETS,
            self.preserve_order
        );

        let (job_tx, job_rx) = bounded(self.pool_size);
        let (result_tx, result_rx) = bounded(self.pool_size);

        let dispatcher = Dispatcher::new(jobs).start(job_tx);
        let pool = WorkerPool::new(self.pool_size, job_rx, result_tx).start();

        let collected = Collector::new(self.collect_mode(), J::TRACKS_OFFSETS, expected, sink)
            .with_progress_interval(self.progress_interval)
            .drain(result_rx);

        // the collector dropped the result queue, so both threads are winding down
        let dispatched = dispatcher.join();
        let pool_status = pool.join();

        let summary = collected?;
        pool_status.map_err(|_| PipelineError::SupervisorPanicked)??;
        let dispatched = dispatched.map_err(|_| PipelineError::DispatcherPanicked)?;
        debug!("Dispatched {dispatched} of {expected} jobs");

        info!("Wrote {} records", summary.records);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mask::KeepMask, Error};

    #[test]
    fn test_builder_defaults() -> Result<()> {
        let pipeline = PipelineBuilder::default().build()?;
        assert_eq!(pipeline.pool_size(), 1);
        assert!(!pipeline.track_offsets());
        assert!(!pipeline.preserve_order());
        assert_eq!(pipeline.collect_mode(), CollectMode::Streaming);
        Ok(())
    }

    #[test]
    fn test_builder_rejects_empty_pool() {
        let err = PipelineBuilder::default().pool_size(0).build().unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigError(ConfigError::InvalidPoolSize(0))
        ));
    }

    #[test]
    fn test_empty_batch() -> Result<()> {
        let pipeline = PipelineBuilder::default().pool_size(3).build()?;
        let mut sink = Vec::new();
        let transform = Arc::new(crate::Reduction::nucleotides());
        let summary = pipeline.run(Vec::new(), transform, &mut sink)?;
        assert_eq!(summary.records, 0);
        assert!(sink.is_empty());
        Ok(())
    }

    #[test]
    fn test_run_plain_closure() -> Result<()> {
        let pipeline = PipelineBuilder::default()
            .pool_size(2)
            .track_offsets(true)
            .preserve_order(true)
            .build()?;
        let batch = vec![Record::new("seqA", "acgt"), Record::new("seqB", "nn")];
        let mut sink = Vec::new();
        let summary = pipeline.run_plain(batch, Arc::new(|s: &str| s.to_uppercase()), &mut sink)?;

        assert_eq!(summary.records, 2);
        assert!(summary.offsets.is_empty());
        assert_eq!(sink[0].sequence, "ACGT");
        assert_eq!(sink[1].sequence, "NN");
        assert!(sink.iter().all(|record| record.mask.is_none()));
        Ok(())
    }

    #[test]
    fn test_run_masked_closure() -> Result<()> {
        let drop_n = |s: &str| {
            let keep: KeepMask = s.bytes().map(|b| b != b'N').collect();
            let reduced: String = s.chars().filter(|&c| c != 'N').collect();
            (reduced, keep)
        };
        let pipeline = PipelineBuilder::default()
            .pool_size(2)
            .preserve_order(true)
            .build()?;
        let batch = vec![Record::new("seqA", "ANNT"), Record::new("seqB", "CG")];
        let mut sink = Vec::new();
        let summary = pipeline.run_masked(batch, Arc::new(drop_n), &mut sink)?;

        assert_eq!(sink[0].sequence, "AT");
        assert_eq!(sink[1].sequence, "CG");
        assert_eq!(summary.offsets.len(), 2);
        let entry = summary
            .offsets
            .iter()
            .find(|entry| entry.name == "seqA")
            .unwrap();
        let keep = entry.decode()?;
        assert_eq!(keep.translate(3), Some(1));
        assert_eq!(keep.translate(1), None);
        Ok(())
    }
}
