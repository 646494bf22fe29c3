use crate::aggregate::{aggregate, PartialCount};
use crate::common::{MapReduceApp, Output};
use crate::error::ShardError;
use crate::merge::merge;
use crate::shard::Shard;
use crate::tokenizer::Tokenizer;

pub struct WordCount {
    tokenizer: Tokenizer,
}

impl WordCount {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }
}

impl MapReduceApp for WordCount {
    fn map(&self, shard: &Shard, contents: &[u8]) -> Result<PartialCount, ShardError> {
        aggregate(&self.tokenizer, shard.id, contents).map_err(|e| match e {
            // report the offset within the source file
            ShardError::InvalidUtf8 { offset } => ShardError::InvalidUtf8 {
                offset: shard.start + offset,
            },
            other => other,
        })
    }

    fn reduce(&self, partials: Vec<PartialCount>) -> Output {
        merge(partials)
    }
}
