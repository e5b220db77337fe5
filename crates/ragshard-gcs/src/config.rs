//! Google Cloud Storage configuration

use serde::{Deserialize, Serialize};
use std::env;

use ragshard_core::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://storage.googleapis.com";

/// Configuration for the GCS uploader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcsConfig {
    pub bucket: String,
    pub project: Option<String>,
    #[serde(skip_serializing, default)]
    pub access_token: String,
    pub api_url: String,
}

impl GcsConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let bucket = env::var("GCS_BUCKET").map_err(|_| {
            Error::Configuration("GCS_BUCKET environment variable not found".to_string())
        })?;

        Self::resolve(bucket, None, None)
    }

    /// Fill in whatever was not given explicitly from the environment.
    ///
    /// Explicit values win over `GCP_PROJECT`/`GOOGLE_CLOUD_PROJECT` and
    /// `GCS_ACCESS_TOKEN`/`GOOGLE_OAUTH_ACCESS_TOKEN`.
    pub fn resolve(
        bucket: impl Into<String>,
        project: Option<String>,
        access_token: Option<String>,
    ) -> Result<Self> {
        Self::resolve_with(bucket, project, access_token, |key| env::var(key).ok())
    }

    /// [`GcsConfig::resolve`] with the environment supplied by `lookup`
    pub(crate) fn resolve_with(
        bucket: impl Into<String>,
        project: Option<String>,
        access_token: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(Error::Configuration("bucket name must not be empty".to_string()));
        }

        let project = project
            .or_else(|| lookup("GCP_PROJECT"))
            .or_else(|| lookup("GOOGLE_CLOUD_PROJECT"));

        let access_token = access_token
            .filter(|token| !token.is_empty())
            .or_else(|| lookup("GCS_ACCESS_TOKEN"))
            .or_else(|| lookup("GOOGLE_OAUTH_ACCESS_TOKEN"))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Configuration(
                "no access token: pass --access-token or set GCS_ACCESS_TOKEN \
                 (e.g. from `gcloud auth print-access-token`)".to_string()
            ))?;

        let api_url = lookup("GCS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            bucket,
            project,
            access_token,
            api_url,
        })
    }

    /// Create configuration with explicit values
    pub fn new(bucket: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            project: None,
            access_token: access_token.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}
