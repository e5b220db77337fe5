use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use ragshard_core::{RecordSource, upload_many};
use ragshard_eval::{PlaceholderEvaluator, run_pipeline};
use ragshard_gcs::{GcsClient, GcsConfig};
use ragshard_shards::{DEFAULT_MAX_BYTES, DEFAULT_SEPARATOR, ShardConfig, export_from_source};
use ragshard_sources::{HuggingFaceConfig, HuggingFaceSource, open_file_source};

#[derive(Parser)]
#[command(name = "ragshard")]
#[command(about = "Export dataset text to size-capped TXT shards and upload them to GCS", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log progress at info level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export one text column to TXT shards, optionally uploading them
    Export(ExportArgs),

    /// Run the evaluation pipeline over a JSON list of questions
    Eval {
        /// Path to the input JSON file
        #[arg(long, default_value = "data/sample_input.json")]
        input: PathBuf,

        /// Path to the output CSV file
        #[arg(long, default_value = "output/metrics.csv")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct ExportArgs {
    /// Hugging Face dataset repo (e.g. org/name)
    #[arg(long, required_unless_present = "input_file", conflicts_with = "input_file")]
    hf_dataset: Option<String>,

    /// Local .jsonl/.json or .csv file to read instead of a Hugging Face dataset
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// Dataset split (e.g. train, validation)
    #[arg(long, default_value = "train")]
    split: String,

    /// Dataset config name
    #[arg(long, default_value = "default")]
    hf_config: String,

    /// Column containing context text
    #[arg(long, default_value = "context")]
    context_col: String,

    /// Directory the shards are written to
    #[arg(long, default_value = "out_txt")]
    out_dir: PathBuf,

    /// Max bytes per TXT shard
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES, value_parser = clap::value_parser!(u64).range(1..))]
    max_bytes: u64,

    /// Do not write '### DOC N' headers
    #[arg(long)]
    no_headers: bool,

    /// GCS bucket name; shards stay local when omitted
    #[arg(long)]
    bucket: Option<String>,

    /// Destination prefix within the bucket
    #[arg(long, default_value = "")]
    dest_prefix: String,

    /// GCP project ID billed for the requests (optional)
    #[arg(long)]
    project: Option<String>,

    /// OAuth access token, e.g. from `gcloud auth print-access-token` (default: $GCS_ACCESS_TOKEN)
    #[arg(long)]
    access_token: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    ragshard_cli::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Export(args) => export(args).await,
        Commands::Eval { input, output } => eval(input, output),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            ragshard_cli::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn export(args: ExportArgs) -> Result<ExitCode> {
    let config = ShardConfig::new(args.max_bytes)
        .with_separator(DEFAULT_SEPARATOR)
        .with_headers(!args.no_headers);

    // Resolve upload settings before reading anything so a bad token fails fast.
    let store = match &args.bucket {
        Some(bucket) => {
            let gcs = GcsConfig::resolve(bucket.clone(), args.project.clone(), args.access_token.clone())?;
            Some(GcsClient::new(gcs)?)
        }
        None => None,
    };

    let mut source = open_source(&args).await?;
    let shards = export_from_source(source.as_mut(), &args.out_dir, &config)
        .await
        .with_context(|| format!("failed to export {}", source.describe()))?;

    let paths = shards.paths();
    if paths.is_empty() {
        error!("No files were written; check your dataset/column.");
        return Ok(ExitCode::from(2));
    }

    ragshard_cli::print_shards(&shards);

    if let Some(store) = store {
        let uploaded = upload_many(&store, &paths, &args.dest_prefix).await?;
        ragshard_cli::print_uploaded(&uploaded);
    }

    ragshard_cli::print_done();
    Ok(ExitCode::SUCCESS)
}

async fn open_source(args: &ExportArgs) -> Result<Box<dyn RecordSource>> {
    match (&args.hf_dataset, &args.input_file) {
        (Some(dataset), None) => {
            info!("Loading dataset: {} [{}]", dataset, args.split);
            let config = HuggingFaceConfig::new(dataset.clone(), args.split.clone(), args.context_col.clone())
                .with_config_name(args.hf_config.clone());
            Ok(Box::new(HuggingFaceSource::new(config)?))
        }
        (None, Some(path)) => {
            info!("Loading file: {}", path.display());
            Ok(open_file_source(path, &args.context_col).await?)
        }
        _ => bail!("pass exactly one of --hf-dataset or --input-file"),
    }
}

fn eval(input: PathBuf, output: PathBuf) -> Result<ExitCode> {
    let report = run_pipeline(&input, &output, &PlaceholderEvaluator)
        .with_context(|| format!("evaluation of {} failed", input.display()))?;
    ragshard_cli::print_metrics_written(&report.output, report.rows);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_defaults() {
        let cli = Cli::try_parse_from(["ragshard", "export", "--hf-dataset", "org/name"]).unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.split, "train");
        assert_eq!(args.context_col, "context");
        assert_eq!(args.out_dir, PathBuf::from("out_txt"));
        assert_eq!(args.max_bytes, 9_000_000);
        assert!(!args.no_headers);
        assert!(args.bucket.is_none());
    }

    #[test]
    fn test_zero_max_bytes_is_rejected() {
        let result = Cli::try_parse_from([
            "ragshard", "export", "--hf-dataset", "org/name", "--max-bytes", "0",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "ragshard", "export", "--hf-dataset", "org/name", "--max-bytes=-5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_export_requires_one_input() {
        assert!(Cli::try_parse_from(["ragshard", "export"]).is_err());
        assert!(Cli::try_parse_from([
            "ragshard", "export", "--hf-dataset", "org/name", "--input-file", "x.csv",
        ])
        .is_err());
    }

    #[tokio::test]
    async fn test_export_from_local_file_without_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("contexts.jsonl");
        std::fs::write(&input, "{\"context\": \"Alpha\"}\n{\"context\": null}\n{\"context\": \"Beta\"}\n").unwrap();
        let out_dir = dir.path().join("out");

        let cli = Cli::try_parse_from([
            "ragshard".into(),
            "export".into(),
            "--input-file".into(),
            input.clone().into_os_string(),
            "--out-dir".into(),
            out_dir.clone().into_os_string(),
        ])
        .unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };

        export(args).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(out_dir.join("corpus_000.txt")).unwrap(),
            "### DOC 000000\nAlpha\n\n\n---\n\n### DOC 000001\nBeta\n\n\n---\n\n"
        );
    }
}
