//! Hugging Face dataset source backed by the dataset viewer rows API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::debug;
use url::Url;

use ragshard_core::{Error, RecordSource, Result, column_text};

/// Largest page the rows endpoint will serve
pub const MAX_PAGE_SIZE: usize = 100;

/// Configuration for reading one column of a dataset split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    pub dataset: String,
    pub config_name: String,
    pub split: String,
    pub column: String,
    pub page_size: usize,
    pub base_url: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl HuggingFaceConfig {
    /// Create configuration with explicit values; the token is read from `HF_TOKEN`
    pub fn new(
        dataset: impl Into<String>,
        split: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            config_name: "default".to_string(),
            split: split.into(),
            column: column.into(),
            page_size: MAX_PAGE_SIZE,
            base_url: env::var("HF_DATASETS_SERVER_URL")
                .unwrap_or_else(|_| "https://datasets-server.huggingface.co".to_string()),
            token: env::var("HF_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    pub fn with_config_name(mut self, config_name: impl Into<String>) -> Self {
        self.config_name = config_name.into();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// URL of the page starting at `offset`
    pub fn rows_url(&self, offset: usize) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/rows", self.base_url.trim_end_matches('/')))
            .map_err(|e| Error::Configuration(format!("invalid dataset server URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("dataset", &self.dataset)
            .append_pair("config", &self.config_name)
            .append_pair("split", &self.split)
            .append_pair("offset", &offset.to_string())
            .append_pair("length", &self.page_size.to_string());
        Ok(url)
    }
}

#[derive(Deserialize)]
struct RowEntry {
    #[serde(default)]
    row_idx: Option<usize>,
    row: Value,
    /// Columns the viewer shortened to fit its response size limit
    #[serde(default)]
    truncated_cells: Vec<String>,
}

#[derive(Deserialize)]
struct RowsPage {
    rows: Vec<RowEntry>,
    num_rows_total: Option<usize>,
}

/// Parse one rows page into column payloads and the reported total row count.
///
/// A row whose `column` cell was truncated by the server is an error, since
/// writing the partial text would silently drop the rest of the record.
pub(crate) fn parse_rows_page(body: &str, column: &str) -> Result<(Vec<Option<String>>, Option<usize>)> {
    let page: RowsPage = serde_json::from_str(body)
        .map_err(|e| Error::Source(format!("unexpected rows response: {}", e)))?;
    let records = page
        .rows
        .iter()
        .map(|entry| {
            if entry.truncated_cells.iter().any(|cell| cell == column) {
                let row = entry
                    .row_idx
                    .map_or_else(|| "?".to_string(), |idx| idx.to_string());
                return Err(Error::Source(format!(
                    "column '{}' of row {} was truncated by the dataset server",
                    column, row
                )));
            }
            Ok(column_text(&entry.row, column))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((records, page.num_rows_total))
}

/// Streams one column of a Hugging Face dataset split page by page
pub struct HuggingFaceSource {
    config: HuggingFaceConfig,
    client: Client,
    offset: usize,
    exhausted: bool,
}

impl HuggingFaceSource {
    pub fn new(config: HuggingFaceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            offset: 0,
            exhausted: false,
        })
    }
}

#[async_trait]
impl RecordSource for HuggingFaceSource {
    async fn next_batch(&mut self) -> Result<Option<Vec<Option<String>>>> {
        if self.exhausted {
            return Ok(None);
        }

        let url = self.config.rows_url(self.offset)?;
        debug!("Fetching {}", url);

        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = &self.config.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Source(format!(
                "rows request for {} [{}] failed with status {}: {}",
                self.config.dataset, self.config.split, status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let (records, total) = parse_rows_page(&body, &self.config.column)?;

        if records.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        self.offset += records.len();
        if total.is_some_and(|total| self.offset >= total) {
            self.exhausted = true;
        }

        Ok(Some(records))
    }

    fn describe(&self) -> String {
        format!(
            "{} [{}/{}] column '{}'",
            self.config.dataset, self.config.config_name, self.config.split, self.config.column
        )
    }
}
