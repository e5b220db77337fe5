//! Google Cloud Storage integration for ragshard
//!
//! This crate provides the GCS implementation of the BlobStore trait.

mod client;
mod config;


pub use client::GcsClient;
pub use config::{GcsConfig, DEFAULT_API_URL};

// Re-export core types for convenience
pub use ragshard_core::{BlobStore, UploadedObject, Error, Result, upload_many};
