//! Units of work executed by the worker pool
//!
//! A job binds one input [`Record`] to one transformation. The pool only knows the
//! [`Job`] contract; whether a job also computes and encodes a keep-mask is decided
//! by which of the two variants the dispatcher built.

use std::sync::Arc;

use crate::{
    error::{MaskMismatch, TransformError},
    mask::{self, KeepMask},
    Record,
};

/// Per-position transformation of a sequence
pub trait Transform: Send + Sync {
    fn apply(&self, sequence: &str) -> String;
}

/// Per-position transformation that also reports which original positions survive
///
/// The returned mask must cover every byte of the input and keep exactly as many
/// positions as the returned sequence is long.
pub trait MaskedTransform: Send + Sync {
    fn apply_masked(&self, sequence: &str) -> (String, KeepMask);
}

impl<F> Transform for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn apply(&self, sequence: &str) -> String {
        self(sequence)
    }
}

impl<F> MaskedTransform for F
where
    F: Fn(&str) -> (String, KeepMask) + Send + Sync,
{
    fn apply_masked(&self, sequence: &str) -> (String, KeepMask) {
        self(sequence)
    }
}

/// Trait for units of work that can be executed by the worker pool.
///
/// `execute` consumes the job, so every job runs at most once.
pub trait Job: Send + 'static {
    /// Whether executed records carry an encoded keep-mask
    const TRACKS_OFFSETS: bool;

    /// Name of the record this job transforms
    fn name(&self) -> &str;

    /// Transform the record into a new output record
    fn execute(self) -> Result<Record, TransformError>;
}

/// Job that only transforms the sequence
pub struct NoOffsetJob<T: ?Sized> {
    record: Record,
    transform: Arc<T>,
}
impl<T: Transform + ?Sized> NoOffsetJob<T> {
    pub fn new(record: Record, transform: Arc<T>) -> Self {
        Self { record, transform }
    }
}
impl<T: Transform + ?Sized + 'static> Job for NoOffsetJob<T> {
    const TRACKS_OFFSETS: bool = false;

    fn name(&self) -> &str {
        &self.record.name
    }

    fn execute(self) -> Result<Record, TransformError> {
        let sequence = self.transform.apply(&self.record.sequence);
        Ok(Record::new(self.record.name, sequence))
    }
}

/// Job that transforms the sequence and encodes the keep-mask of the transformation
pub struct WithOffsetJob<T: ?Sized> {
    record: Record,
    transform: Arc<T>,
}
impl<T: MaskedTransform + ?Sized> WithOffsetJob<T> {
    pub fn new(record: Record, transform: Arc<T>) -> Self {
        Self { record, transform }
    }
}
impl<T: MaskedTransform + ?Sized + 'static> Job for WithOffsetJob<T> {
    const TRACKS_OFFSETS: bool = true;

    fn name(&self) -> &str {
        &self.record.name
    }

    fn execute(self) -> Result<Record, TransformError> {
        let (sequence, keep) = self.transform.apply_masked(&self.record.sequence);

        let mismatch = if keep.len() != self.record.sequence.len() {
            Some(MaskMismatch::OriginalLength {
                mask: keep.len(),
                sequence: self.record.sequence.len(),
            })
        } else if keep.count_ones() != sequence.len() {
            Some(MaskMismatch::KeptLength {
                kept: keep.count_ones(),
                transformed: sequence.len(),
            })
        } else {
            None
        };
        if let Some(source) = mismatch {
            return Err(TransformError::CodecFailure {
                name: self.record.name,
                source,
            });
        }

        Ok(Record::with_mask(
            self.record.name,
            sequence,
            mask::encode(&keep),
        ))
    }
}
