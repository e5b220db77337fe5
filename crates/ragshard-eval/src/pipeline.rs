//! Evaluation pipeline: questions in, metrics CSV out

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use ragshard_core::{Error, Result};

use crate::evaluator::Evaluator;
use crate::questions::load_questions;

/// Column order of the metrics CSV
pub const METRICS_HEADER: [&str; 3] = ["question", "precision", "faithfulness"];

#[derive(Debug, Serialize)]
struct MetricsRow<'a> {
    question: &'a str,
    precision: f64,
    faithfulness: f64,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub output: PathBuf,
    pub rows: usize,
    pub skipped: usize,
}

/// Evaluate every question in `input` and write one CSV row per question to `output`.
///
/// Entries without a non-empty `question` are skipped. The output directory is
/// created if needed and an existing file is overwritten.
pub fn run_pipeline<E: Evaluator + ?Sized>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    evaluator: &E,
) -> Result<EvaluationReport> {
    let output = output.as_ref();
    let questions = load_questions(input.as_ref())?;
    info!(
        "Evaluating {} entries from {} with {} evaluator",
        questions.len(),
        input.as_ref().display(),
        evaluator.name()
    );

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // Header is written by hand so that an empty question set still gets one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output)
        .map_err(csv_error)?;
    writer.write_record(METRICS_HEADER).map_err(csv_error)?;

    let mut rows = 0;
    let mut skipped = 0;
    for item in &questions {
        let Some(question) = item.text() else {
            skipped += 1;
            continue;
        };

        let metrics = evaluator.evaluate(question)?;
        debug!("{:?} -> {:?}", question, metrics);

        writer
            .serialize(MetricsRow {
                question,
                precision: metrics.precision,
                faithfulness: metrics.faithfulness,
            })
            .map_err(csv_error)?;
        rows += 1;
    }
    writer.flush()?;

    Ok(EvaluationReport {
        output: output.to_path_buf(),
        rows,
        skipped,
    })
}

fn csv_error(err: csv::Error) -> Error {
    if err.is_io_error() {
        if let csv::ErrorKind::Io(io) = err.into_kind() {
            return Error::Io(io);
        }
        return Error::Serialization("CSV I/O error".to_string());
    }
    Error::Serialization(err.to_string())
}
