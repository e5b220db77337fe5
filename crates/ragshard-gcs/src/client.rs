//! Google Cloud Storage client implementation

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

use ragshard_core::{BlobStore, Error, Result, UploadedObject};

use crate::config::GcsConfig;

/// Uploads objects through the GCS JSON API
pub struct GcsClient {
    config: GcsConfig,
    client: Client,
}

#[derive(Deserialize)]
struct ObjectResource {
    bucket: String,
    name: String,
    size: Option<String>,
}

impl GcsClient {
    /// Create a new GCS client from configuration
    pub fn new(config: GcsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new GCS client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GcsConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &GcsConfig {
        &self.config
    }

    /// Media upload endpoint for `object_name`
    pub(crate) fn upload_url(&self, object_name: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| Error::Configuration(format!("invalid GCS API URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| Error::Configuration(format!("GCS API URL cannot be a base: {}", self.config.api_url)))?
            .pop_if_empty()
            .extend(["upload", "storage", "v1", "b", self.config.bucket.as_str(), "o"]);

        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", object_name);

        Ok(url)
    }

    /// `gs://` URI of an object in the configured bucket
    pub fn object_uri(&self, object_name: &str) -> String {
        format!("gs://{}/{}", self.config.bucket, object_name)
    }
}

#[async_trait]
impl BlobStore for GcsClient {
    async fn upload_file(
        &self,
        path: &Path,
        object_name: &str,
        content_type: &str,
    ) -> Result<UploadedObject> {
        let body = tokio::fs::read(path).await?;
        let local_size = body.len() as u64;
        let url = self.upload_url(object_name)?;
        debug!("Uploading {} ({} bytes) to {}", path.display(), local_size, url);

        let mut request = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.access_token))
            .header("Content-Type", content_type)
            .body(body);
        if let Some(project) = &self.config.project {
            request = request.header("x-goog-user-project", project);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(format!(
                    "GCS rejected credentials for gs://{} ({}): {}",
                    self.config.bucket, status, error_text
                )),
                _ => Error::Storage(format!(
                    "upload of {} failed with status {}: {}",
                    object_name, status, error_text
                )),
            });
        }

        let resource: ObjectResource = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let size = resource
            .size
            .and_then(|size| size.parse().ok())
            .unwrap_or(local_size);

        Ok(UploadedObject {
            uri: format!("gs://{}/{}", resource.bucket, resource.name),
            bucket: resource.bucket,
            name: resource.name,
            size,
            uploaded_at: Utc::now(),
        })
    }

    fn bucket(&self) -> &str {
        &self.config.bucket
    }
}
