//! Record source trait and value mapping

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// A lazily produced stream of optional text records.
///
/// Sources hand out records one batch at a time so that callers can stream an
/// arbitrarily large dataset with bounded memory. `None` entries inside a batch
/// are absent payloads; consumers skip them entirely.
#[async_trait]
pub trait RecordSource: Send {
    /// Fetch the next batch of records, or `Ok(None)` once the source is exhausted
    async fn next_batch(&mut self) -> Result<Option<Vec<Option<String>>>>;

    /// Human-readable description used in log lines
    fn describe(&self) -> String;
}

/// Extract the text payload of `column` from a JSON row.
///
/// A missing column yields an empty payload, `null` yields an absent payload,
/// strings pass through and every other value is rendered as JSON text.
pub fn column_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column) {
        None => Some(String::new()),
        Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// In-memory source, mostly useful for tests and small programmatic exports
pub struct VecSource {
    batches: std::vec::IntoIter<Vec<Option<String>>>,
}

impl VecSource {
    /// Serve `records` in batches of at most `batch_size`
    pub fn new(records: Vec<Option<String>>, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        let mut batches = Vec::new();
        let mut iter = records.into_iter().peekable();
        while iter.peek().is_some() {
            batches.push(iter.by_ref().take(batch_size).collect());
        }
        Self {
            batches: batches.into_iter(),
        }
    }
}

#[async_trait]
impl RecordSource for VecSource {
    async fn next_batch(&mut self) -> Result<Option<Vec<Option<String>>>> {
        Ok(self.batches.next())
    }

    fn describe(&self) -> String {
        "in-memory records".to_string()
    }
}
