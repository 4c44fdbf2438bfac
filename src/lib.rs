//! # seqreduce
//!
//! Parallel reduction of named sequences with optional coordinate tracking.
//!
//! A batch of [`Record`]s is transformed by a fixed-size pool of worker threads. Each
//! record becomes one [`Job`]; the pool reports exactly one outcome per job and the
//! collector forwards the results to a [`RecordSink`], either as they complete or in
//! the original batch order.
//!
//! When offsets are tracked, every job also produces a [`KeepMask`](mask::KeepMask):
//! one bit per original position, set when the position survives the reduction.
//! Masks are encoded right away and answer coordinate queries through `rank`
//! (original to reduced) and `select` (reduced to original).
//!
//! ```rust
//! use std::sync::Arc;
//! use seqreduce::{PipelineBuilder, Record, Reduction, Result};
//!
//! # fn main() -> Result<()> {
//! let batch = vec![Record::new("seqA", "ACGT"), Record::new("seqB", "AANT")];
//! let pipeline = PipelineBuilder::default()
//!     .pool_size(4)
//!     .track_offsets(true)
//!     .preserve_order(true)
//!     .build()?;
//!
//! let mut reduced = Vec::new();
//! let summary = pipeline.run(batch, Arc::new(Reduction::nucleotides()), &mut reduced)?;
//!
//! assert_eq!(reduced[1].sequence, "AAT");
//! let seq_b = summary.offsets.iter().find(|e| e.name == "seqB").unwrap().decode()?;
//! assert_eq!(seq_b.translate(3), Some(2));
//! assert_eq!(seq_b.select(3)?, 3);
//! # Ok(())
//! # }
//! ```

mod error;
mod job;
mod progress;
mod record;
mod reduction;

pub mod fasta;
pub mod mask;
pub mod offsets;
pub mod pipeline;

pub use error::{
    CodecError, ConfigError, Error, MaskMismatch, OffsetFileError, PayloadError, PipelineError,
    ReductionError, Result, TransformError,
};
pub use fasta::FastaWriter;
pub use job::{Job, MaskedTransform, NoOffsetJob, Transform, WithOffsetJob};
pub use pipeline::{CollectMode, OffsetEntry, Pipeline, PipelineBuilder, RunSummary};
pub use progress::ProgressTracker;
pub use record::{Record, RecordSink};
pub use reduction::Reduction;
