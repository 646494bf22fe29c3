use std::io;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::common::{Input, MapReduceApp, Output};
use crate::error::{JobError, JobResult};

use super::worker_pool::WorkerPool;

pub struct Coordinator {}

impl Coordinator {
    /// Maps `shards` on a pool of `workers_count` threads and reduces the
    /// results. At most two shards per worker are queued at a time, so a
    /// failure stops the dispatch of everything not yet queued.
    pub fn start_pool(
        &self,
        shards: Input,
        workers_count: usize,
        mr_app: Arc<dyn MapReduceApp>,
    ) -> JobResult<Output> {
        let pool = WorkerPool::new(workers_count, Arc::clone(&mr_app));
        let window = pool.size() * 2;
        let total = shards.len();
        let mut pending = shards.into_iter();
        let mut in_flight = 0;
        let mut partials = Vec::with_capacity(total);

        loop {
            while in_flight < window {
                let Some(shard) = pending.next() else { break };
                if !pool.run_task(shard) {
                    return Err(pool_closed());
                }
                in_flight += 1;
            }
            if in_flight == 0 {
                break;
            }

            match pool.next_result() {
                Some(Ok(partial)) => {
                    in_flight -= 1;
                    partials.push(partial);
                    debug!(done = partials.len(), total, "shard finished");
                }
                Some(Err(err)) => {
                    warn!(error = %err, "cancelling outstanding shards");
                    pool.cancel();
                    return Err(err);
                }
                None => return Err(pool_closed()),
            }
        }

        Ok(mr_app.reduce(partials))
    }
}

fn pool_closed() -> JobError {
    JobError::Io(io::Error::other("worker pool shut down unexpectedly"))
}
