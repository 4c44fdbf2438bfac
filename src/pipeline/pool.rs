use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, error};

use crate::{
    error::{PipelineError, TransformError},
    job::Job,
    Record, Result,
};

/// A job tagged with the position of its record in the batch
pub struct Ticket<J> {
    pub serial: usize,
    pub job: J,
}

/// The single outcome every dispatched job produces
#[derive(Debug)]
pub struct Outcome {
    /// Position of the record in the batch
    pub serial: usize,

    /// The output record, or the reason the job failed
    pub result: std::result::Result<Record, TransformError>,
}

/// A fixed number of workers between the work queue and the result queue
///
/// Each worker pulls one ticket at a time, executes it and pushes the outcome.
/// Workers exit once the work queue is closed and drained. A supervisor thread
/// joins all of them before it releases the last result sender, so the result
/// queue only closes once no outcome can follow.
///
/// A panicking job takes its worker down without an outcome. The remaining
/// workers keep draining the queue and the supervisor resolves to
/// [`PipelineError::WorkerPanicked`] for the first worker lost.
pub struct WorkerPool<J> {
    pool_size: usize,
    jobs: Receiver<Ticket<J>>,
    results: Sender<Outcome>,
}
impl<J: Job> WorkerPool<J> {
    pub fn new(pool_size: usize, jobs: Receiver<Ticket<J>>, results: Sender<Outcome>) -> Self {
        Self {
            pool_size,
            jobs,
            results,
        }
    }

    /// Spawns the workers and returns the handle of their supervisor
    ///
    /// The handle resolves once every worker has exited and the result queue is closed.
    pub fn start(self) -> JoinHandle<Result<()>> {
        thread::spawn(move || self.supervise())
    }

    fn supervise(self) -> Result<()> {
        let Self {
            pool_size,
            jobs,
            results,
        } = self;

        let handles: Vec<_> = (0..pool_size)
            .map(|tid| {
                let jobs = jobs.clone();
                let results = results.clone();
                thread::spawn(move || worker(tid, &jobs, &results))
            })
            .collect();

        // the dispatcher must notice when every worker is gone
        drop(jobs);

        let mut status = Ok(());
        for (tid, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                error!("Worker {tid} panicked");
                if status.is_ok() {
                    status = Err(PipelineError::WorkerPanicked(tid).into());
                }
            }
        }

        // barrier passed: no worker can push another outcome
        drop(results);
        status
    }
}

fn worker<J: Job>(tid: usize, jobs: &Receiver<Ticket<J>>, results: &Sender<Outcome>) -> usize {
    debug!("Worker {tid} started");
    let mut executed = 0;
    for Ticket { serial, job } in jobs {
        let result = job.execute();
        executed += 1;
        if results.send(Outcome { serial, result }).is_err() {
            debug!("Worker {tid} stopping: result queue closed by the collector");
            break;
        }
    }
    debug!("Worker {tid} finished after {executed} jobs");
    executed
}
