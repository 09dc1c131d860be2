//! CLI entry point for the tabular preprocessing pipeline.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;

use tabular_prep::{DatasetRecord, InMemoryRecordStore, Orchestrator, PipelineConfig, RecordStore};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Asynchronous tabular preprocessing pipeline",
    long_about = "Runs the full preprocessing chain over a CSV file:\n\
                  transformation, deduplication, imputation, outlier removal,\n\
                  normalization. The result is written next to the input as\n\
                  <name>_processed.csv.\n\n\
                  EXAMPLES:\n  \
                  # Basic usage\n  \
                  tabular-prep -i data.csv\n\n  \
                  # Keep the target column unscaled, skip an id column\n  \
                  tabular-prep -i data.csv --target Survived --ignore PassengerId"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: String,

    /// Target column for ML prediction (kept unscaled when categorical)
    #[arg(short, long)]
    target: Option<String>,

    /// Columns to drop before processing (repeatable)
    #[arg(long = "ignore")]
    ignored: Vec<String>,

    /// Lower quantile for outlier bounds (0.0 - 1.0)
    #[arg(long, default_value = "0.15")]
    lower_quantile: f64,

    /// Upper quantile for outlier bounds (0.0 - 1.0)
    #[arg(long, default_value = "0.85")]
    upper_quantile: f64,

    /// IQR multiplier for outlier bounds
    #[arg(long, default_value = "1.5")]
    iqr_factor: f64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    if !std::path::Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = PipelineConfig::builder()
        .lower_quantile(args.lower_quantile)
        .upper_quantile(args.upper_quantile)
        .iqr_factor(args.iqr_factor)
        .build()?;

    let store = Arc::new(InMemoryRecordStore::new());
    let mut record = DatasetRecord::new(1, &args.input).with_ignored_columns(args.ignored);
    if let Some(target) = args.target {
        record = record.with_target(target);
    }
    store.insert(record);

    info!("Processing dataset: {}", args.input);
    let orchestrator = Orchestrator::new(store.clone(), config);
    orchestrator.start(1)?.wait().await?;

    let record = store.get(1)?;
    match record.error_message {
        None => {
            let result = record
                .result_path
                .ok_or_else(|| anyhow!("chain finished without a result path"))?;
            info!("Result written to: {}", result.display());
            if let Some(report) = record.report_path {
                info!("Report written to: {}", report.display());
            }
            Ok(())
        }
        Some(message) => Err(anyhow!("preprocessing failed: {message}")),
    }
}
