mod coordinator;
mod worker_pool;

use std::sync::Arc;

use crate::common::{Input, MapReduce, MapReduceApp, Output};
use crate::config::JobConfig;
use crate::error::JobResult;
use async_trait::async_trait;
use coordinator::Coordinator;

pub struct ParallelMapReduce {
    input: Input,
    mr_app: Arc<dyn MapReduceApp>,
    workers: usize,
}

impl ParallelMapReduce {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

#[async_trait]
impl MapReduce for ParallelMapReduce {
    fn new(input: Input, mr_app: Arc<dyn MapReduceApp>) -> Self {
        Self {
            input,
            mr_app,
            workers: JobConfig::default().workers,
        }
    }

    async fn run(self) -> JobResult<Output> {
        let coord = Coordinator {};
        let output = tokio::task::spawn_blocking(move || {
            coord.start_pool(self.input, self.workers, self.mr_app)
        })
        .await??;

        Ok(output)
    }
}
