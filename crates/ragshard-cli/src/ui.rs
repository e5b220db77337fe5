//! UI utilities for the CLI

use colored::*;
use std::path::Path;

use ragshard_core::UploadedObject;
use ragshard_shards::ShardSet;

/// One line per shard: path, size and record count
pub fn format_shard_lines(set: &ShardSet) -> Vec<String> {
    set.shards
        .iter()
        .map(|shard| {
            format!(
                "{} ({} bytes, {} records)",
                shard.path.display(),
                shard.bytes,
                shard.records
            )
        })
        .collect()
}

/// Print the local shards written by an export
pub fn print_shards(set: &ShardSet) {
    println!();
    println!("{}", "Written files:".bold());
    for line in format_shard_lines(set) {
        println!("   {}", line);
    }
}

/// Print the URIs of uploaded shards
pub fn print_uploaded(objects: &[UploadedObject]) {
    println!();
    println!("{}", "Uploaded files:".bold());
    for object in objects {
        println!("   {}", object.uri.green());
    }
}

/// Print the closing line of a successful run
pub fn print_done() {
    println!();
    println!("{}", "Done.".green().bold());
}

/// Print where the evaluation metrics went
pub fn print_metrics_written(output: &Path, rows: usize) {
    println!(
        "{} Metrics written to {} ({} rows)",
        "✅".green(),
        output.display(),
        rows
    );
}

/// Print a fatal error before exiting
pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red());
}
