//! Rolling shard writer

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use ragshard_core::{Error, Result};

use crate::block::serialize_block;
use crate::config::ShardConfig;

/// One finished shard file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardInfo {
    pub index: usize,
    pub path: PathBuf,
    pub bytes: u64,
    pub records: usize,
}

/// Ordered list of shards produced by one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShardSet {
    pub shards: Vec<ShardInfo>,
}

impl ShardSet {
    /// Shard paths in index order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.shards.iter().map(|shard| shard.path.clone()).collect()
    }

    /// Total number of records written across all shards
    pub fn total_records(&self) -> usize {
        self.shards.iter().map(|shard| shard.records).sum()
    }

    /// Total number of bytes written across all shards
    pub fn total_bytes(&self) -> u64 {
        self.shards.iter().map(|shard| shard.bytes).sum()
    }
}

/// Streams records into size-capped shard files.
///
/// Shard 0 is created eagerly by [`ShardWriter::create`], so every run yields at
/// least one file even when no record is ever pushed. At most one shard file is
/// open at a time; it is flushed and closed before the next one is opened, and
/// dropping the writer closes whatever is still open. If opening the next shard
/// fails, the writer holds no file and every further push returns an error.
pub struct ShardWriter {
    config: ShardConfig,
    output_dir: PathBuf,
    finished: Vec<ShardInfo>,
    current: Option<BufWriter<File>>,
    current_info: ShardInfo,
    next_record: usize,
}

impl ShardWriter {
    /// Validate `config`, create `output_dir` and open the first shard
    pub fn create(output_dir: impl AsRef<Path>, config: ShardConfig) -> Result<Self> {
        config.validate()?;

        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;

        let (current, current_info) = open_shard(&output_dir, &config, 0)?;

        Ok(Self {
            config,
            output_dir,
            finished: Vec::new(),
            current: Some(current),
            current_info,
            next_record: 0,
        })
    }

    /// Push an optional record; `None` is skipped without consuming an index
    pub fn push(&mut self, text: Option<&str>) -> Result<()> {
        match text {
            Some(text) => self.push_text(text),
            None => Ok(()),
        }
    }

    /// Serialize and append one record, rolling to a new shard if it would overflow
    pub fn push_text(&mut self, text: &str) -> Result<()> {
        let block = serialize_block(
            self.next_record,
            text,
            &self.config.separator,
            self.config.include_headers,
        );
        let block_bytes = block.len() as u64;

        if self.current_info.records > 0
            && self.current_info.bytes + block_bytes > self.config.max_bytes
        {
            self.roll()?;
        }

        let current = self.current.as_mut().ok_or_else(|| {
            Error::Io(std::io::Error::other(format!(
                "no open shard after {} failed to open",
                self.config.shard_file_name(self.current_info.index + 1)
            )))
        })?;
        current.write_all(block.as_bytes())?;
        self.current_info.bytes += block_bytes;
        self.current_info.records += 1;
        self.next_record += 1;

        Ok(())
    }

    /// Number of records written so far
    pub fn records_written(&self) -> usize {
        self.next_record
    }

    /// Directory the shards are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Flush and close the open shard and return the finished set
    pub fn finish(mut self) -> Result<ShardSet> {
        if let Some(mut current) = self.current.take() {
            current.flush()?;
        }
        let mut shards = self.finished;
        shards.push(self.current_info);
        Ok(ShardSet { shards })
    }

    fn roll(&mut self) -> Result<()> {
        // The previous shard is closed when `previous` goes out of scope,
        // before the next one is created.
        if let Some(mut previous) = self.current.take() {
            previous.flush()?;
        }

        let next_index = self.current_info.index + 1;
        let (next, next_info) = open_shard(&self.output_dir, &self.config, next_index)?;

        self.current = Some(next);
        let finished = std::mem::replace(&mut self.current_info, next_info);
        debug!(
            "Closed shard {} ({} bytes, {} records)",
            finished.path.display(),
            finished.bytes,
            finished.records
        );
        self.finished.push(finished);

        Ok(())
    }
}

fn open_shard(
    output_dir: &Path,
    config: &ShardConfig,
    index: usize,
) -> Result<(BufWriter<File>, ShardInfo)> {
    let path = output_dir.join(config.shard_file_name(index));
    let file = File::create(&path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open shard {}: {}", path.display(), e),
        ))
    })?;
    debug!("Opened shard {}", path.display());

    Ok((
        BufWriter::new(file),
        ShardInfo {
            index,
            path,
            bytes: 0,
            records: 0,
        },
    ))
}

/// Write `records` into size-capped shards under `output_dir`.
///
/// `None` records are filtered out before enumeration, so header indices count
/// emitted records only. Returns the shard paths in index order; the list is
/// never empty.
pub fn write_shards<I, S>(
    records: I,
    output_dir: impl AsRef<Path>,
    config: &ShardConfig,
) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut writer = ShardWriter::create(output_dir, config.clone())?;
    for text in records.into_iter().flatten() {
        writer.push_text(text.as_ref())?;
    }
    Ok(writer.finish()?.paths())
}

/// Like [`write_shards`], but for fallible record sources.
///
/// The first upstream error aborts the run and is returned unchanged; shards
/// written up to that point are closed and left on disk.
pub fn try_write_shards<I, S, E>(
    records: I,
    output_dir: impl AsRef<Path>,
    config: &ShardConfig,
) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = std::result::Result<Option<S>, E>>,
    S: AsRef<str>,
    E: Into<Error>,
{
    let mut writer = ShardWriter::create(output_dir, config.clone())?;
    for record in records {
        let record = record.map_err(Into::<Error>::into)?;
        writer.push(record.as_ref().map(|text| text.as_ref()))?;
    }
    Ok(writer.finish()?.paths())
}
