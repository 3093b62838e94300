//! Fixed-size worker pool over a bounded job queue
//!
//! Workers pull boxed jobs from a shared `sync_channel`. Submitting blocks
//! once `capacity` jobs are waiting, which keeps a large request from
//! queueing unbounded work. A panicking job is caught and logged so the
//! worker keeps serving the queue.
//!
//! Jobs must not hold an `Arc<WorkerPool>`: dropping the pool joins its
//! workers, and a worker cannot join itself.

use crate::error::{InstallerError, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(id: usize, queue: Arc<Mutex<Receiver<Job>>>) -> Result<Self> {
        let handle = thread::Builder::new()
            .name(format!("install-worker-{}", id))
            .spawn(move || {
                debug!("Worker {} started", id);
                loop {
                    let next = match queue.lock() {
                        Ok(rx) => rx.recv(),
                        Err(poisoned) => poisoned.into_inner().recv(),
                    };
                    let Ok(job) = next else { break };

                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        error!("Worker {}: job panicked", id);
                    }
                }
                debug!("Worker {} shut down", id);
            })
            .map_err(|e| InstallerError::pool(format!("failed to spawn worker {}: {}", id, e)))?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }
}

/// Pool of worker threads
pub struct WorkerPool {
    sender: Mutex<Option<SyncSender<Job>>>,
    workers: Vec<Worker>,
    capacity: usize,
}

impl WorkerPool {
    /// Spawn `size` workers sharing a queue of `capacity` pending jobs
    pub fn new(size: usize, capacity: usize) -> Result<Self> {
        if size == 0 {
            return Err(InstallerError::pool("pool needs at least one worker"));
        }
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::sync_channel::<Job>(capacity);
        let queue = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| Worker::spawn(id, Arc::clone(&queue)))
            .collect::<Result<Vec<_>>>()?;

        debug!("Worker pool started: {} worker(s), queue capacity {}", size, capacity);
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers,
            capacity,
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue a job, blocking while the queue is full
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        // Clone under the lock, send outside it so a full queue does not
        // block other submitters on the mutex.
        let sender = self
            .sender
            .lock()
            .map_err(|_| InstallerError::pool("sender mutex poisoned"))?
            .clone()
            .ok_or_else(|| InstallerError::pool("pool is shutting down"))?;

        sender
            .send(Box::new(job))
            .map_err(|_| InstallerError::pool("all workers have exited"))
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    error!("Worker {} panicked during shutdown", worker.id);
                }
            }
        }
    }
}
