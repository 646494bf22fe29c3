//! Per-shard counting, the map and combine side of the job.

use std::collections::HashMap;

use crate::error::ShardError;
use crate::shard::ShardId;
use crate::tokenizer::{Token, Tokenizer};

/// Word counts for a single shard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartialCount {
    pub shard: ShardId,
    pub counts: HashMap<Token, u64>,
    /// Tokens emitted by the tokenizer, i.e. the sum of `counts`.
    pub tokens: u64,
    pub bytes: u64,
}

impl PartialCount {
    pub fn new(shard: ShardId) -> Self {
        Self {
            shard,
            ..Default::default()
        }
    }

    pub fn record(&mut self, token: Token) {
        *self.counts.entry(token).or_insert(0) += 1;
        self.tokens += 1;
    }

    pub fn get(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }
}

/// Counts the tokens of one shard's bytes.
pub fn aggregate(
    tokenizer: &Tokenizer,
    shard: ShardId,
    bytes: &[u8],
) -> Result<PartialCount, ShardError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ShardError::InvalidUtf8 {
        offset: e.valid_up_to() as u64,
    })?;

    let mut partial = PartialCount::new(shard);
    partial.bytes = bytes.len() as u64;
    for token in tokenizer.tokens(text) {
        partial.record(token);
    }
    Ok(partial)
}
