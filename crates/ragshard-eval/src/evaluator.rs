//! Evaluator trait and the placeholder implementation

use serde::{Deserialize, Serialize};

use ragshard_core::Result;

/// Per-question evaluation scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub precision: f64,
    pub faithfulness: f64,
}

/// Trait for question evaluators
///
/// Implementations retrieve context for a question and score the result.
pub trait Evaluator: Send + Sync {
    /// Score a single question
    fn evaluate(&self, question: &str) -> Result<Metrics>;

    /// Short name used in log lines
    fn name(&self) -> &str;
}

/// Evaluator that scores every question as zero.
///
/// Stands in for a real retrieval and scoring backend so that the pipeline and
/// its output format can be exercised end to end.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEvaluator;

impl Evaluator for PlaceholderEvaluator {
    fn evaluate(&self, _question: &str) -> Result<Metrics> {
        Ok(Metrics::default())
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}
