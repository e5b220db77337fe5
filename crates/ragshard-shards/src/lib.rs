//! Size-capped text shard writer for ragshard
//!
//! Turns a stream of text records into sequentially numbered plain-text files
//! (`corpus_000.txt`, `corpus_001.txt`, ...) whose UTF-8 size stays under a
//! configured cap, ready for bulk upload to a blob store.

mod block;
mod config;
mod export;
mod writer;


pub use block::serialize_block;
pub use config::{ShardConfig, DEFAULT_MAX_BYTES, DEFAULT_SEPARATOR};
pub use export::export_from_source;
pub use writer::{ShardInfo, ShardSet, ShardWriter, try_write_shards, write_shards};

// Re-export core types for convenience
pub use ragshard_core::{Error, RecordSource, Result};
