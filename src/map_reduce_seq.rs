use std::sync::Arc;

use async_trait::async_trait;

use crate::common::{run_map, Input, MapReduce, MapReduceApp, Output};
use crate::error::JobResult;

/// Runs every shard on the calling thread, in order.
pub struct SequentialMapReduce {
    input: Input,
    mr_app: Arc<dyn MapReduceApp>,
}

impl SequentialMapReduce {
    pub fn run_sync(self) -> JobResult<Output> {
        let partials = self
            .input
            .iter()
            .map(|shard| run_map(self.mr_app.as_ref(), shard))
            .collect::<JobResult<Vec<_>>>()?;

        Ok(self.mr_app.reduce(partials))
    }
}

#[async_trait]
impl MapReduce for SequentialMapReduce {
    fn new(input: Input, mr_app: Arc<dyn MapReduceApp>) -> Self {
        Self { input, mr_app }
    }

    async fn run(self) -> JobResult<Output> {
        self.run_sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::PartialCount;
    use crate::error::{JobError, ShardError};
    use crate::map_reduce_apps::WordCount;
    use crate::shard::{Shard, ShardId};
    use crate::tokenizer::Tokenizer;
    use std::fs;
    use tempfile::TempDir;

    struct PanicsOnSecond(WordCount);

    impl MapReduceApp for PanicsOnSecond {
        fn map(&self, shard: &Shard, contents: &[u8]) -> Result<PartialCount, ShardError> {
            if shard.id == ShardId(1) {
                panic!("bad shard {}", shard.id);
            }
            self.0.map(shard, contents)
        }

        fn reduce(&self, partials: Vec<PartialCount>) -> Output {
            self.0.reduce(partials)
        }
    }

    fn shards(dir: &TempDir, texts: &[&str]) -> Vec<Shard> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let path = dir.path().join(format!("{i}.txt"));
                fs::write(&path, text).unwrap();
                Shard {
                    id: ShardId(i),
                    source: path,
                    start: 0,
                    end: text.len() as u64,
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn counts_in_order() {
        let dir = TempDir::new().unwrap();
        let app = Arc::new(WordCount::new(Tokenizer::default()));
        let out = SequentialMapReduce::new(shards(&dir, &["a b", "b c", ""]), app)
            .run()
            .await
            .unwrap();
        assert_eq!(out.get("b"), 2);
        assert_eq!(out.total(), 4);
    }

    #[tokio::test]
    async fn panic_becomes_worker_failure() {
        let dir = TempDir::new().unwrap();
        let app = Arc::new(PanicsOnSecond(WordCount::new(Tokenizer::default())));
        let err = SequentialMapReduce::new(shards(&dir, &["a", "b", "c"]), app)
            .run()
            .await
            .unwrap_err();
        match err {
            JobError::WorkerFailure { shard, source } => {
                assert_eq!(shard, ShardId(1));
                assert!(matches!(source, ShardError::Panicked(msg) if msg == "bad shard 00001"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
