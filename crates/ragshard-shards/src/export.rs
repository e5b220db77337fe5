//! Drain a record source into shards

use std::path::Path;
use tracing::{debug, info};

use ragshard_core::{RecordSource, Result};

use crate::config::ShardConfig;
use crate::writer::{ShardSet, ShardWriter};

/// Stream every batch of `source` into shards under `output_dir`.
///
/// Only one batch is held in memory at a time. Source errors abort the export
/// unchanged after the open shard has been closed.
pub async fn export_from_source<S: RecordSource + ?Sized>(
    source: &mut S,
    output_dir: impl AsRef<Path>,
    config: &ShardConfig,
) -> Result<ShardSet> {
    let mut writer = ShardWriter::create(output_dir, config.clone())?;
    info!("Exporting {} into {}", source.describe(), writer.output_dir().display());

    let mut batches = 0usize;
    while let Some(batch) = source.next_batch().await? {
        batches += 1;
        debug!("Batch {}: {} records", batches, batch.len());
        for record in batch {
            writer.push(record.as_deref())?;
        }
    }

    let set = writer.finish()?;
    info!(
        "Wrote {} records ({} bytes) into {} shard(s)",
        set.total_records(),
        set.total_bytes(),
        set.shards.len()
    );
    Ok(set)
}
