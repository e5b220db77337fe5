//! Core traits and types for ragshard
//!
//! This crate defines the error type and the capability-facing interfaces shared
//! across the workspace: record sources that feed the shard writer and blob
//! stores that receive the finished shards.

pub mod error;
pub mod record;
pub mod storage;

pub use error::{Error, Result};
pub use record::{RecordSource, VecSource, column_text};
pub use storage::{BlobStore, UploadedObject, TEXT_CONTENT_TYPE, object_name, upload_many};
