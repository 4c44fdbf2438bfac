use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::Sender;
use log::debug;

use super::pool::Ticket;
use crate::{
    job::{Job, MaskedTransform, NoOffsetJob, Transform, WithOffsetJob},
    Record,
};

/// The jobs of one run, all of the same variant
///
/// The variant is chosen once for the whole batch, so the pool never branches on
/// whether a record needs its keep-mask encoded.
pub enum JobBatch<T: ?Sized> {
    NoOffset(Vec<NoOffsetJob<T>>),
    WithOffset(Vec<WithOffsetJob<T>>),
}
impl<T> JobBatch<T>
where
    T: Transform + MaskedTransform + ?Sized,
{
    /// Wraps every record of the batch into a job, preserving batch order
    pub fn new(batch: Vec<Record>, track_offsets: bool, transform: Arc<T>) -> Self {
        if track_offsets {
            Self::WithOffset(
                batch
                    .into_iter()
                    .map(|record| WithOffsetJob::new(record, Arc::clone(&transform)))
                    .collect(),
            )
        } else {
            Self::NoOffset(
                batch
                    .into_iter()
                    .map(|record| NoOffsetJob::new(record, Arc::clone(&transform)))
                    .collect(),
            )
        }
    }
}
impl<T: ?Sized> JobBatch<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::NoOffset(jobs) => jobs.len(),
            Self::WithOffset(jobs) => jobs.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn tracks_offsets(&self) -> bool {
        matches!(self, Self::WithOffset(_))
    }
}

/// Feeds jobs, in batch order, into the bounded work queue
///
/// Sending blocks while the queue is full; this is the only backpressure between
/// the batch and the workers.
pub struct Dispatcher<J> {
    jobs: Vec<J>,
}
impl<J: Job> Dispatcher<J> {
    #[must_use]
    pub fn new(jobs: Vec<J>) -> Self {
        Self { jobs }
    }

    /// Starts feeding on a dedicated thread
    ///
    /// The queue closes when the thread finishes. The handle resolves to the number
    /// of jobs handed to the workers, which is short of the batch size only if every
    /// worker went away first.
    pub fn start(self, queue: Sender<Ticket<J>>) -> JoinHandle<usize> {
        thread::spawn(move || self.feed(&queue))
    }

    fn feed(self, queue: &Sender<Ticket<J>>) -> usize {
        let total = self.jobs.len();
        for (serial, job) in self.jobs.into_iter().enumerate() {
            if queue.send(Ticket { serial, job }).is_err() {
                debug!("Dispatcher stopping after {serial} of {total} jobs: no worker left");
                return serial;
            }
        }
        debug!("Dispatched {total} jobs");
        total
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crossbeam_channel::bounded;

    use super::*;
    use crate::reduction::Reduction;

    fn batch() -> Vec<Record> {
        vec![
            Record::new("seqA", "ACGT"),
            Record::new("seqB", "AANT"),
            Record::new("seqC", "NNNN"),
        ]
    }

    #[test]
    fn test_variant_chosen_once() {
        let reduction = Arc::new(Reduction::nucleotides());
        let plain = JobBatch::new(batch(), false, Arc::clone(&reduction));
        assert!(!plain.tracks_offsets());
        assert_eq!(plain.len(), 3);

        let tracked = JobBatch::new(batch(), true, reduction);
        assert!(tracked.tracks_offsets());
        assert_eq!(tracked.len(), 3);
    }

    #[test]
    fn test_feed_in_batch_order() {
        let JobBatch::NoOffset(jobs) =
            JobBatch::new(batch(), false, Arc::new(Reduction::nucleotides()))
        else {
            panic!("expected jobs without offsets");
        };
        let (tx, rx) = bounded(1);
        let handle = Dispatcher::new(jobs).start(tx);

        let names: Vec<String> = rx
            .iter()
            .map(|ticket| {
                assert!(ticket.serial < 3);
                ticket.job.name().to_string()
            })
            .collect();
        assert_eq!(names, vec!["seqA", "seqB", "seqC"]);
        assert_eq!(handle.join().unwrap(), 3);
    }

    #[test]
    fn test_feed_blocks_on_full_queue() {
        let batch: Vec<_> = (0..10)
            .map(|i| Record::new(format!("r{i}"), "ACGT"))
            .collect();
        let JobBatch::NoOffset(jobs) =
            JobBatch::new(batch, false, Arc::new(Reduction::nucleotides()))
        else {
            panic!("expected jobs without offsets");
        };
        let (tx, rx) = bounded(3);
        let handle = Dispatcher::new(jobs).start(tx);

        let deadline = Instant::now() + Duration::from_secs(5);
        while rx.len() < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        thread::sleep(Duration::from_millis(20));
        assert_eq!(rx.len(), 3);
        assert!(!handle.is_finished());

        drop(rx);
        assert_eq!(handle.join().unwrap(), 3);
    }

    #[test]
    fn test_feed_stops_without_workers() {
        let JobBatch::NoOffset(jobs) =
            JobBatch::new(batch(), false, Arc::new(Reduction::nucleotides()))
        else {
            panic!("expected jobs without offsets");
        };
        let (tx, rx) = bounded(1);
        drop(rx);
        let handle = Dispatcher::new(jobs).start(tx);
        assert_eq!(handle.join().unwrap(), 0);
    }
}
