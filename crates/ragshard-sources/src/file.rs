//! Local file sources: JSON Lines, JSON arrays and headered CSV

use async_trait::async_trait;
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use ragshard_core::{Error, RecordSource, Result, VecSource, column_text};

/// Records pulled from a local file per batch
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Reads one JSON object per line and extracts `column`
pub struct JsonlSource {
    path: PathBuf,
    column: String,
    lines: Lines<BufReader<tokio::fs::File>>,
    line_no: usize,
    batch_size: usize,
}

impl JsonlSource {
    pub async fn open(path: impl AsRef<Path>, column: impl Into<String>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = tokio::fs::File::open(&path).await?;

        Ok(Self {
            path,
            column: column.into(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

#[async_trait]
impl RecordSource for JsonlSource {
    async fn next_batch(&mut self) -> Result<Option<Vec<Option<String>>>> {
        let mut batch = Vec::with_capacity(self.batch_size);

        while batch.len() < self.batch_size {
            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            let row: serde_json::Value = serde_json::from_str(&line).map_err(|e| {
                Error::Serialization(format!(
                    "{}:{}: invalid JSON line: {}",
                    self.path.display(),
                    self.line_no,
                    e
                ))
            })?;
            batch.push(column_text(&row, &self.column));
        }

        Ok(if batch.is_empty() { None } else { Some(batch) })
    }

    fn describe(&self) -> String {
        format!("{} column '{}'", self.path.display(), self.column)
    }
}

/// Reads one column of a headered CSV file.
///
/// Opening reads the header row synchronously; batches are read on the
/// blocking thread pool.
pub struct CsvSource {
    path: PathBuf,
    column: String,
    column_index: usize,
    // Lent to the blocking task for the duration of each batch.
    reader: Option<csv::Reader<File>>,
    batch_size: usize,
}

impl CsvSource {
    pub fn open(path: impl AsRef<Path>, column: impl Into<String>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let column = column.into();

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| csv_error(&path, e))?;

        let headers = reader.headers().map_err(|e| csv_error(&path, e))?;
        let column_index = headers.iter().position(|h| h == column).ok_or_else(|| {
            Error::InvalidInput(format!(
                "Column '{}' not found in {}. Available: {:?}",
                column,
                path.display(),
                headers.iter().collect::<Vec<_>>()
            ))
        })?;

        Ok(Self {
            path,
            column,
            column_index,
            reader: Some(reader),
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    async fn next_batch(&mut self) -> Result<Option<Vec<Option<String>>>> {
        let Some(mut reader) = self.reader.take() else {
            return Err(Error::Source(format!(
                "{} is unreadable after an earlier failure",
                self.path.display()
            )));
        };
        let column_index = self.column_index;
        let batch_size = self.batch_size;

        let (reader, batch) = tokio::task::spawn_blocking(move || {
            let batch = read_csv_batch(&mut reader, column_index, batch_size);
            (reader, batch)
        })
        .await
        .map_err(|e| Error::Other(format!("CSV reader task failed: {}", e)))?;
        self.reader = Some(reader);

        let batch = batch.map_err(|e| csv_error(&self.path, e))?;
        Ok(if batch.is_empty() { None } else { Some(batch) })
    }

    fn describe(&self) -> String {
        format!("{} column '{}'", self.path.display(), self.column)
    }
}

fn read_csv_batch(
    reader: &mut csv::Reader<File>,
    column_index: usize,
    batch_size: usize,
) -> csv::Result<Vec<Option<String>>> {
    let mut batch = Vec::with_capacity(batch_size);
    let mut record = csv::StringRecord::new();

    while batch.len() < batch_size && reader.read_record(&mut record)? {
        // Short rows are treated like a missing column.
        let cell = record.get(column_index).unwrap_or_default();
        batch.push(Some(cell.to_string()));
    }

    Ok(batch)
}

/// Read a `.json` file holding a top-level array of row objects
async fn open_json_array(path: &Path, column: &str) -> Result<VecSource> {
    let content = tokio::fs::read_to_string(path).await?;
    let rows: Vec<Value> = serde_json::from_str(&content).map_err(|e| {
        Error::Serialization(format!("{}: invalid JSON array: {}", path.display(), e))
    })?;
    let records = rows.iter().map(|row| column_text(row, column)).collect();
    Ok(VecSource::new(records, DEFAULT_BATCH_SIZE))
}

/// Whether the first non-whitespace byte of the file opens a JSON array
async fn starts_with_array(path: &Path) -> Result<bool> {
    let mut lines = BufReader::new(tokio::fs::File::open(path).await?).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(first) = line.trim_start().chars().next() {
            return Ok(first == '[');
        }
    }
    Ok(false)
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => Error::Io(io),
            other => Error::Serialization(format!("{}: {:?}", path.display(), other)),
        }
    } else {
        Error::Serialization(format!("{}: {}", path.display(), err))
    }
}

/// Open a file source, choosing the format from the file extension.
///
/// A `.json` file may hold either a top-level array of rows or JSON Lines.
pub async fn open_file_source(path: impl AsRef<Path>, column: &str) -> Result<Box<dyn RecordSource>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let json_array = extension.as_deref() == Some("json") && starts_with_array(path).await?;

    match extension.as_deref() {
        Some("csv") => Ok(Box::new(CsvSource::open(path, column)?)),
        Some("json") if json_array => Ok(Box::new(open_json_array(path, column).await?)),
        Some("jsonl") | Some("ndjson") | Some("json") => {
            Ok(Box::new(JsonlSource::open(path, column).await?))
        }
        _ => Err(Error::InvalidInput(format!(
            "unsupported input file {}: expected .csv, .jsonl, .ndjson or .json",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    async fn drain(source: &mut dyn RecordSource) -> Vec<Vec<Option<String>>> {
        let mut batches = Vec::new();
        while let Some(batch) = source.next_batch().await.unwrap() {
            batches.push(batch);
        }
        batches
    }

    #[tokio::test]
    async fn test_jsonl_source_batches_and_maps_values() {
        let file = temp_file(
            ".jsonl",
            "{\"context\": \"a\"}\n\n{\"context\": null}\n{\"other\": 1}\n{\"context\": 7}\n",
        );
        let mut source = JsonlSource::open(file.path(), "context")
            .await
            .unwrap()
            .with_batch_size(2);

        let batches = drain(&mut source).await;
        assert_eq!(
            batches,
            vec![
                vec![Some("a".to_string()), None],
                vec![Some(String::new()), Some("7".to_string())],
            ]
        );
    }

    #[tokio::test]
    async fn test_jsonl_source_reports_bad_line() {
        let file = temp_file(".jsonl", "{\"context\": \"a\"}\nnot json\n");
        let mut source = JsonlSource::open(file.path(), "context").await.unwrap();

        let err = source.next_batch().await.unwrap_err();
        match err {
            Error::Serialization(msg) => assert!(msg.contains(":2:"), "{}", msg),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_csv_source_reads_column() {
        let file = temp_file(
            ".csv",
            "question,context,answer\nq1,\"first, with comma\",a1\nq2,,a2\nq3\n",
        );
        let mut source = CsvSource::open(file.path(), "context").unwrap().with_batch_size(10);

        let batches = drain(&mut source).await;
        assert_eq!(
            batches,
            vec![vec![
                Some("first, with comma".to_string()),
                Some(String::new()),
                Some(String::new()),
            ]]
        );
    }

    #[tokio::test]
    async fn test_json_array_file() {
        let file = temp_file(
            ".json",
            "\n[\n  {\"context\": \"Alpha\"},\n  {\"context\": null},\n  {\"id\": 3}\n]\n",
        );
        let mut source = open_file_source(file.path(), "context").await.unwrap();

        assert_eq!(
            drain(source.as_mut()).await,
            vec![vec![Some("Alpha".to_string()), None, Some(String::new())]]
        );
    }

    #[tokio::test]
    async fn test_json_file_that_is_not_an_array_of_rows() {
        let file = temp_file(".json", "[1, \"two\"]");
        let mut source = open_file_source(file.path(), "context").await.unwrap();
        assert_eq!(
            drain(source.as_mut()).await,
            vec![vec![Some(String::new()), Some(String::new())]]
        );

        let broken = temp_file(".json", "[{\"context\": ");
        let err = open_file_source(broken.path(), "context").await.err().unwrap();
        assert!(matches!(err, Error::Serialization(ref msg) if msg.contains("invalid JSON array")));
    }

    #[tokio::test]
    async fn test_csv_source_reads_across_batches() {
        let file = temp_file(".csv", "context\na\nb\nc\n");
        let mut source = CsvSource::open(file.path(), "context").unwrap().with_batch_size(2);

        assert_eq!(
            drain(&mut source).await,
            vec![
                vec![Some("a".to_string()), Some("b".to_string())],
                vec![Some("c".to_string())],
            ]
        );
    }

    #[test]
    fn test_csv_source_rejects_missing_column() {
        let file = temp_file(".csv", "question,answer\nq,a\n");

        let err = CsvSource::open(file.path(), "context").err().unwrap();
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("Column 'context' not found")));
    }

    #[tokio::test]
    async fn test_open_file_source_by_extension() {
        let csv = temp_file(".CSV", "context\nx\n");
        let mut source = open_file_source(csv.path(), "context").await.unwrap();
        assert_eq!(drain(source.as_mut()).await, vec![vec![Some("x".to_string())]]);

        let jsonl = temp_file(".json", "{\"context\": \"line\"}\n");
        let mut source = open_file_source(jsonl.path(), "context").await.unwrap();
        assert_eq!(drain(source.as_mut()).await, vec![vec![Some("line".to_string())]]);

        let txt = temp_file(".txt", "x");
        let err = open_file_source(txt.path(), "context").await.err().unwrap();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
