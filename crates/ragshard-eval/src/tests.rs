//! End-to-end tests for the evaluation pipeline

#[cfg(test)]
mod pipeline_tests {
    use crate::{Error, Evaluator, Metrics, PlaceholderEvaluator, Result, run_pipeline};
    use insta::assert_snapshot;
    use std::fs;
    use tempfile::tempdir;

    struct LengthEvaluator;

    impl Evaluator for LengthEvaluator {
        fn evaluate(&self, question: &str) -> Result<Metrics> {
            Ok(Metrics {
                precision: question.len() as f64,
                faithfulness: 0.5,
            })
        }

        fn name(&self) -> &str {
            "length"
        }
    }

    struct FailingEvaluator;

    impl Evaluator for FailingEvaluator {
        fn evaluate(&self, _question: &str) -> Result<Metrics> {
            Err(Error::Network("retriever unavailable".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_pipeline_writes_metrics_csv() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("sample_input.json");
        let output = dir.path().join("output").join("metrics.csv");
        fs::write(
            &input,
            r#"[
                {"question": "What is retrieval-augmented generation?"},
                {"question": ""},
                {"answer": "orphan"},
                {"question": "Which store holds the chunks, and why?"}
            ]"#,
        )
        .unwrap();

        let report = run_pipeline(&input, &output, &PlaceholderEvaluator).unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.output, output);
        assert_snapshot!(fs::read_to_string(&output).unwrap(), @r###"
        question,precision,faithfulness
        What is retrieval-augmented generation?,0.0,0.0
        "Which store holds the chunks, and why?",0.0,0.0
        "###);
    }

    #[test]
    fn test_empty_question_set_still_has_header() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.json");
        let output = dir.path().join("metrics.csv");
        fs::write(&input, "[]").unwrap();

        let report = run_pipeline(&input, &output, &PlaceholderEvaluator).unwrap();

        assert_eq!(report.rows, 0);
        assert_eq!(fs::read_to_string(&output).unwrap(), "question,precision,faithfulness\n");
    }

    #[test]
    fn test_custom_evaluator_scores_are_written() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("q.json");
        let output = dir.path().join("m.csv");
        fs::write(&input, r#"[{"question": "abcd"}]"#).unwrap();

        run_pipeline(&input, &output, &LengthEvaluator).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "question,precision,faithfulness\nabcd,4.0,0.5\n"
        );
    }

    #[test]
    fn test_evaluator_error_aborts_run() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("q.json");
        fs::write(&input, r#"[{"question": "abcd"}]"#).unwrap();

        let err = run_pipeline(&input, dir.path().join("m.csv"), &FailingEvaluator).unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_non_list_input_is_rejected() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("q.json");
        let output = dir.path().join("m.csv");
        fs::write(&input, r#"{"question": "abcd"}"#).unwrap();

        let err = run_pipeline(&input, &output, &PlaceholderEvaluator).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempdir().unwrap();
        let err = run_pipeline(
            dir.path().join("nope.json"),
            dir.path().join("m.csv"),
            &PlaceholderEvaluator,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
