use std::path::PathBuf;

use thiserror::Error;

use crate::shard::ShardId;

pub type JobResult<T> = Result<T, JobError>;

/// Errors that abort a word-count job.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("input path does not exist: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("output path already exists: {}", path.display())]
    OutputExists { path: PathBuf },

    #[error("worker failed on shard {shard}")]
    WorkerFailure {
        shard: ShardId,
        #[source]
        source: ShardError,
    },

    #[error("invalid job configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("job runner task failed: {0}")]
    Runtime(#[from] tokio::task::JoinError),
}

/// Faults raised while a worker reads or tokenizes one shard.
#[derive(Error, Debug)]
pub enum ShardError {
    #[error("failed to read shard: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid UTF-8 at byte offset {offset}")]
    InvalidUtf8 { offset: u64 },

    #[error("worker panicked: {0}")]
    Panicked(String),
}

impl ShardError {
    pub(crate) fn into_job_error(self, shard: ShardId) -> JobError {
        JobError::WorkerFailure {
            shard,
            source: self,
        }
    }
}
