//! Record sources for ragshard
//!
//! Every source implements [`RecordSource`] and yields one column of a dataset
//! as optional text payloads, a batch at a time.

mod file;
mod huggingface;

pub use file::{CsvSource, JsonlSource, DEFAULT_BATCH_SIZE, open_file_source};
pub use huggingface::{HuggingFaceConfig, HuggingFaceSource, MAX_PAGE_SIZE};

// Re-export core types for convenience
pub use ragshard_core::{Error, RecordSource, Result};
