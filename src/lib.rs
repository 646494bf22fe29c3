//! Batch word counting over local text files.
//!
//! Input files are cut into line-aligned [`shard::Shard`]s, each shard is
//! counted on its own (see [`aggregate`]), and the per-shard counts are
//! summed by [`merge`] into one sorted [`merge::FinalCount`]. [`job::Job`]
//! drives the whole thing and commits the result with [`output::write`].

pub mod aggregate;
pub mod common;
pub mod config;
pub mod error;
pub mod job;
pub mod map_reduce_apps;
pub mod map_reduce_seq;
pub mod merge;
pub mod mr_parallel;
pub mod output;
pub mod shard;
pub mod tokenizer;
