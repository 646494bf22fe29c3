use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use uuid::Uuid;

use async_channel::{Receiver, Sender};
use tracing::{debug, trace, warn};

use crate::aggregate::PartialCount;
use crate::common::{run_map, MapReduceApp};
use crate::error::JobResult;
use crate::shard::Shard;

/// Fixed set of threads that map shards. Jobs go in through a bounded
/// queue, results come back on an unbounded one in completion order.
pub struct WorkerPool {
    workers: Vec<Worker>,
    sender: Sender<Job>,
    results: Receiver<JobResult<PartialCount>>,
    results_tx: Sender<JobResult<PartialCount>>,
    app: Arc<dyn MapReduceApp>,
    cancelled: Arc<AtomicBool>,
}

type Job = Box<dyn FnOnce(&str) + Send + 'static>;

impl WorkerPool {
    pub fn new(size: usize, app: Arc<dyn MapReduceApp>) -> WorkerPool {
        assert!(size > 0);

        let (sender, receiver) = async_channel::bounded(size);
        let (results_tx, results) = async_channel::unbounded();
        let mut workers = Vec::with_capacity(size);

        for _ in 0..size {
            workers.push(Worker::new(receiver.clone()));
        }

        WorkerPool {
            workers,
            sender,
            results,
            results_tx,
            app,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    fn execute<F>(&self, f: F) -> bool
    where
        F: FnOnce(&str) + Send + 'static,
    {
        let job = Box::new(f);
        self.sender.send_blocking(job).is_ok()
    }

    /// Queues `shard` for mapping. Returns `false` if the pool no longer
    /// accepts work.
    pub fn run_task(&self, shard: Shard) -> bool {
        let app = Arc::clone(&self.app);
        let results = self.results_tx.clone();
        let cancelled = Arc::clone(&self.cancelled);
        self.execute(move |worker_id| {
            if cancelled.load(Ordering::SeqCst) {
                trace!(worker = worker_id, shard = %shard.id, "skipping cancelled shard");
                return;
            }
            debug!(worker = worker_id, %shard, "map start");
            let result = run_map(app.as_ref(), &shard);
            // the receiving side only goes away together with the pool
            let _ = results.send_blocking(result);
        })
    }

    /// Blocks until some worker finishes a shard.
    pub fn next_result(&self) -> Option<JobResult<PartialCount>> {
        self.results.recv_blocking().ok()
    }

    /// Stops taking work. Shards still queued are skipped by the workers.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.sender.close();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sender.close();
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    warn!(worker = %worker.id, "worker thread panicked");
                }
            }
        }
    }
}

pub struct Worker {
    pub id: String,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    pub fn new(receiver: Receiver<Job>) -> Worker {
        let id = Uuid::new_v4().to_string();
        let id_clone = id.clone();
        let thread = thread::spawn(move || {
            while let Ok(job) = receiver.recv_blocking() {
                job(&id_clone);
            }
            trace!(worker = %id_clone, "worker exiting");
        });

        Worker {
            id,
            thread: Some(thread),
        }
    }
}
