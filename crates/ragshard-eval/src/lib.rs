//! Question-set evaluation pipeline for ragshard
//!
//! Reads a JSON list of questions, scores each one with an [`Evaluator`] and
//! writes a `question,precision,faithfulness` CSV.

mod evaluator;
mod pipeline;
mod questions;

#[cfg(test)]
mod tests;

pub use evaluator::{Evaluator, Metrics, PlaceholderEvaluator};
pub use pipeline::{EvaluationReport, METRICS_HEADER, run_pipeline};
pub use questions::{QuestionItem, load_questions, parse_questions};

// Re-export core types for convenience
pub use ragshard_core::{Error, Result};
