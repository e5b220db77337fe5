//! Blob store trait and upload helpers

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{Error, Result};

/// Content type used for corpus shards
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// An object that has been written to a blob store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedObject {
    pub bucket: String,
    pub name: String,
    pub uri: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Trait for blob stores (e.g., Google Cloud Storage)
///
/// This trait defines the interface used to publish exported shards.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload a local file under `object_name` with the given content type
    async fn upload_file(
        &self,
        path: &Path,
        object_name: &str,
        content_type: &str,
    ) -> Result<UploadedObject>;

    /// Name of the bucket objects are written to
    fn bucket(&self) -> &str;
}

/// Join a destination prefix and a file name into an object name
pub fn object_name(prefix: &str, file_name: &str) -> String {
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", prefix.trim_end_matches('/'), file_name)
    }
}

/// Upload every path in order, keeping only the file name under `prefix`.
///
/// Stops at the first failure; objects uploaded before it are left in place.
pub async fn upload_many<S: BlobStore + ?Sized>(
    store: &S,
    paths: &[PathBuf],
    prefix: &str,
) -> Result<Vec<UploadedObject>> {
    let mut uploaded = Vec::with_capacity(paths.len());

    for path in paths {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::InvalidInput(format!("not a file path: {}", path.display())))?;
        let dest = object_name(prefix, file_name);

        let object = store.upload_file(path, &dest, TEXT_CONTENT_TYPE).await?;
        info!("Uploaded {} -> {}", path.display(), object.uri);
        uploaded.push(object);
    }

    Ok(uploaded)
}
