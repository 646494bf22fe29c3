//! Reduction of partial counts into the job's final count.

use std::collections::BTreeMap;

use crate::aggregate::PartialCount;
use crate::tokenizer::Token;

/// Merged word counts, ordered by word.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FinalCount {
    counts: BTreeMap<Token, u64>,
}

impl FinalCount {
    /// Adds every count of `partial` into `self`. Absorbing the same set of
    /// partials in any order gives the same result.
    pub fn absorb(&mut self, partial: PartialCount) {
        for (token, count) in partial.counts {
            *self.counts.entry(token).or_insert(0) += count;
        }
    }

    pub fn get(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

pub fn merge<I>(partials: I) -> FinalCount
where
    I: IntoIterator<Item = PartialCount>,
{
    partials
        .into_iter()
        .fold(FinalCount::default(), |mut acc, partial| {
            acc.absorb(partial);
            acc
        })
}
