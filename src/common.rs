use async_trait::async_trait;
use std::{
    any::Any,
    fs,
    io::ErrorKind,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, warn};

use crate::{
    aggregate::PartialCount,
    error::{JobError, JobResult, ShardError},
    merge::FinalCount,
    shard::Shard,
};

/// shards to process
pub type Input = Vec<Shard>;
/// merged counts
pub type Output = FinalCount;

pub trait MapReduceApp: Send + Sync {
    fn map(&self, shard: &Shard, contents: &[u8]) -> Result<PartialCount, ShardError>;
    fn reduce(&self, partials: Vec<PartialCount>) -> Output;
}

#[async_trait]
pub trait MapReduce {
    fn new(input: Input, mr_app: Arc<dyn MapReduceApp>) -> Self;
    async fn run(self) -> JobResult<Output>;
}

/// Reads and maps one shard. A panic inside the app is reported as a
/// failure of that shard.
pub fn run_map(app: &dyn MapReduceApp, shard: &Shard) -> JobResult<PartialCount> {
    let contents = shard
        .read()
        .map_err(|e| ShardError::from(e).into_job_error(shard.id))?;
    let partial = panic::catch_unwind(AssertUnwindSafe(|| app.map(shard, &contents)))
        .unwrap_or_else(|payload| Err(ShardError::Panicked(panic_message(payload))))
        .map_err(|e| e.into_job_error(shard.id))?;
    debug!(
        shard = %shard.id,
        tokens = partial.tokens,
        distinct = partial.counts.len(),
        "map done"
    );
    Ok(partial)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Files to count under `input`: the file itself, or the regular files
/// directly inside a directory, sorted by name. Names starting with `_` or
/// `.` are skipped.
pub fn read_files_from_dir(input: &Path) -> JobResult<Vec<PathBuf>> {
    let meta = fs::metadata(input).map_err(|e| match e.kind() {
        ErrorKind::NotFound => JobError::InputNotFound {
            path: input.to_path_buf(),
        },
        _ => JobError::Io(e),
    })?;
    if meta.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('_') || n.starts_with('.'));
        if hidden {
            debug!(path = %path.display(), "skipping hidden file");
        } else if path.is_file() {
            files.push(path);
        } else {
            warn!(path = %path.display(), "skipping non-file input entry");
        }
    }
    files.sort();
    Ok(files)
}
