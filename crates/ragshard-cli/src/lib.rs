//! CLI support for ragshard: logging setup and terminal output

pub mod logging;
mod ui;

pub use ui::{
    format_shard_lines, print_done, print_error, print_metrics_written, print_shards,
    print_uploaded,
};

// Re-export core types
pub use ragshard_core::{Error, Result};
