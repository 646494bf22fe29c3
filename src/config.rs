//! Job parameters.

use std::num::NonZeroUsize;
use std::thread;

use crate::error::{JobError, JobResult};
use crate::tokenizer::{CaseNormalization, DelimiterPolicy};

pub const DEFAULT_JOB_NAME: &str = "Word Count";

#[derive(Clone, Debug)]
pub struct JobConfig {
    pub job_name: String,
    /// Number of shards the driver aims for. The actual count can differ by
    /// up to the number of input files, since shards never span two files.
    pub shard_count: usize,
    pub workers: usize,
    pub delimiter: DelimiterPolicy,
    pub case: CaseNormalization,
}

impl Default for JobConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self {
            job_name: DEFAULT_JOB_NAME.to_string(),
            shard_count: workers,
            workers,
            delimiter: DelimiterPolicy::default(),
            case: CaseNormalization::default(),
        }
    }
}

impl JobConfig {
    pub fn with_job_name(mut self, name: impl Into<String>) -> Self {
        self.job_name = name.into();
        self
    }

    pub fn with_shard_count(mut self, n: usize) -> Self {
        self.shard_count = n;
        self
    }

    /// Size of the worker pool. `1` runs every shard on the calling thread.
    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    pub fn with_delimiter(mut self, delimiter: DelimiterPolicy) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_case(mut self, case: CaseNormalization) -> Self {
        self.case = case;
        self
    }

    pub fn validate(&self) -> JobResult<()> {
        if self.workers == 0 {
            return Err(JobError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.shard_count == 0 {
            return Err(JobError::InvalidConfig(
                "shard count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
