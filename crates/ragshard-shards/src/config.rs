//! Shard writer configuration

use serde::{Deserialize, Serialize};

use ragshard_core::{Error, Result};

/// Delimiter written after every record
pub const DEFAULT_SEPARATOR: &str = "\n\n---\n\n";

/// Keeps each shard under the 10 MB per-file limit of managed RAG corpora
pub const DEFAULT_MAX_BYTES: u64 = 9_000_000;

/// Configuration for a shard writer run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardConfig {
    /// Maximum cumulative UTF-8 size of a shard once it holds a block
    pub max_bytes: u64,
    /// Delimiter appended after every record, including the last one
    pub separator: String,
    /// Prefix each block with a `### DOC nnnnnn` marker line
    pub include_headers: bool,
    /// File name prefix (default: "corpus")
    pub file_prefix: String,
    /// File extension without the dot (default: "txt")
    pub extension: String,
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            separator: DEFAULT_SEPARATOR.to_string(),
            include_headers: true,
            file_prefix: "corpus".to_string(),
            extension: "txt".to_string(),
        }
    }
}

impl ShardConfig {
    /// Create a configuration with the given cap and default naming
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            ..Default::default()
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_headers(mut self, include_headers: bool) -> Self {
        self.include_headers = include_headers;
        self
    }

    pub fn with_file_prefix(mut self, file_prefix: impl Into<String>) -> Self {
        self.file_prefix = file_prefix.into();
        self
    }

    /// Reject configurations that cannot produce valid shards
    pub fn validate(&self) -> Result<()> {
        if self.max_bytes == 0 {
            return Err(Error::Configuration(
                "max_bytes must be a positive number of bytes".to_string(),
            ));
        }
        if self.file_prefix.is_empty() {
            return Err(Error::Configuration("file_prefix must not be empty".to_string()));
        }
        if self.file_prefix.contains(['/', '\\']) {
            return Err(Error::Configuration(format!(
                "file_prefix must be a plain file name, got {:?}",
                self.file_prefix
            )));
        }
        Ok(())
    }

    /// File name of the shard with the given index, e.g. `corpus_007.txt`
    pub fn shard_file_name(&self, index: usize) -> String {
        format!("{}_{:03}.{}", self.file_prefix, index, self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_cap_is_rejected() {
        let err = ShardConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_prefix_with_separator_is_rejected() {
        let config = ShardConfig::default().with_file_prefix("../corpus");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shard_file_name() {
        let config = ShardConfig::default();
        assert_eq!(config.shard_file_name(0), "corpus_000.txt");
        assert_eq!(config.shard_file_name(42), "corpus_042.txt");
        assert_eq!(config.shard_file_name(1234), "corpus_1234.txt");
    }
}
