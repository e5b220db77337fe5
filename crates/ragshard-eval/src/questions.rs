//! Question set loading

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

use ragshard_core::{Error, Result};

/// One entry of a question set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionItem {
    /// The `question` field rendered as text, when present and truthy
    pub question: Option<String>,
    /// The entry as it appeared in the input
    pub raw: Value,
}

impl QuestionItem {
    fn from_value(raw: Value) -> Self {
        let question = raw.get("question").and_then(question_text);
        Self { question, raw }
    }

    /// The question text, if it is present and non-empty
    pub fn text(&self) -> Option<&str> {
        self.question.as_deref().filter(|q| !q.is_empty())
    }
}

/// Text for a `question` value; null, false, zero and empty values have none
fn question_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("True".to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Parse a JSON array of question objects
pub fn parse_questions(json: &str) -> Result<Vec<QuestionItem>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(items) => Ok(items.into_iter().map(QuestionItem::from_value).collect()),
        _ => Err(Error::InvalidInput(
            "Input JSON must contain a list of questions".to_string(),
        )),
    }
}

/// Load a question set from a JSON file
pub fn load_questions(path: impl AsRef<Path>) -> Result<Vec<QuestionItem>> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_questions(&content)
}
