//! The job driver: from an input path to a committed output file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::common::{read_files_from_dir, MapReduce, MapReduceApp};
use crate::config::JobConfig;
use crate::error::{JobError, JobResult};
use crate::map_reduce_apps::WordCount;
use crate::map_reduce_seq::SequentialMapReduce;
use crate::merge::FinalCount;
use crate::mr_parallel::ParallelMapReduce;
use crate::output;
use crate::shard::{self, Shard};
use crate::tokenizer::Tokenizer;

/// Counters reported when a job completes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobStats {
    pub input_files: usize,
    pub shards: usize,
    pub bytes_read: u64,
    pub tokens: u64,
    pub distinct_words: usize,
}

pub struct Job {
    id: Uuid,
    config: JobConfig,
    app: Arc<dyn MapReduceApp>,
}

impl Job {
    pub fn new(config: JobConfig) -> JobResult<Self> {
        config.validate()?;
        let app = Arc::new(WordCount::new(Tokenizer::from_config(&config)));
        Ok(Self {
            id: Uuid::new_v4(),
            config,
            app,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn split(&self, inputs: &[PathBuf]) -> JobResult<Vec<Shard>> {
        Ok(shard::split(inputs, self.config.shard_count)?)
    }

    pub async fn run(&self, shards: Vec<Shard>) -> JobResult<FinalCount> {
        let app = Arc::clone(&self.app);
        if self.config.workers == 1 {
            SequentialMapReduce::new(shards, app).run().await
        } else {
            ParallelMapReduce::new(shards, app)
                .with_workers(self.config.workers)
                .run()
                .await
        }
    }

    pub fn write(&self, counts: &FinalCount, destination: &Path) -> JobResult<()> {
        output::write(counts, destination)
    }

    /// Runs the whole job. Both paths are checked before any shard is read,
    /// and nothing is written unless every shard succeeded.
    pub async fn execute(&self, input: &Path, destination: &Path) -> JobResult<JobStats> {
        let span = info_span!("job", id = %self.id, name = %self.config.job_name);
        async {
            let started = Instant::now();
            let inputs = read_files_from_dir(input)?;
            output::check_destination(destination)?;

            let shards = self.split(&inputs)?;
            info!(
                files = inputs.len(),
                shards = shards.len(),
                workers = self.config.workers,
                "job started"
            );
            let bytes_read = shards.iter().map(Shard::len).sum();
            let shard_count = shards.len();

            let counts = self.run(shards).await?;
            self.write(&counts, destination)?;

            let stats = JobStats {
                input_files: inputs.len(),
                shards: shard_count,
                bytes_read,
                tokens: counts.total(),
                distinct_words: counts.len(),
            };
            info!(
                bytes_read = stats.bytes_read,
                tokens = stats.tokens,
                distinct_words = stats.distinct_words,
                elapsed_ms = started.elapsed().as_millis() as u64,
                output = %destination.display(),
                "job completed"
            );
            Ok::<_, JobError>(stats)
        }
        .instrument(span)
        .await
    }
}
