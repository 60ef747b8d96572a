// src/main.rs
use clap::{Parser, Subcommand};
use findsum_metrics::extractors::{fallback_extraction, ResponseRecord, StructuredExtractor};
use findsum_metrics::llm::client::{OpenAiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use findsum_metrics::metrics::{extract_table_metrics, FinancialTables};
use findsum_metrics::storage::{load_findsum_data, StorageManager};
use findsum_metrics::utils::{self, AppError};
use std::path::PathBuf;
use std::time::Duration;

/// Command Line Interface for FINDSum metric extraction
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory for extracted content
    #[arg(short, long, default_value = "./output", global = true)]
    output_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract table metrics for FINDSum rows and write them next to the input CSV columns
    Tables {
        /// Report CSV (one row per document)
        #[arg(long)]
        csv: PathBuf,

        /// JSON-lines file of table tuples, aligned with the CSV rows
        #[arg(long)]
        tables: PathBuf,

        /// Number of rows to read from each input
        #[arg(short, long, default_value = "10")]
        num_rows: usize,

        /// Output CSV file name (inside the output directory)
        #[arg(long, default_value = "output.csv")]
        output: String,
    },

    /// Extract headline metrics and context from an agent response record
    Extract {
        /// File holding the record (JSON or dict literal)
        #[arg(short, long)]
        input: PathBuf,

        /// Model identifier passed to the completion service
        #[arg(short, long, default_value = DEFAULT_MODEL)]
        model: String,

        /// API key for the completion service
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Base URL of an OpenAI-compatible API
        #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Seconds to wait for the model before falling back
        #[arg(long, default_value = "60")]
        timeout_secs: u64,

        /// Skip the model and use regex extraction only
        #[arg(long)]
        offline: bool,

        /// Base name for the output files (defaults to the input file stem)
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing, output directory: {}", args.output_dir);

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    match args.command {
        Command::Tables { csv, tables, num_rows, output } => {
            let (table, records) = load_findsum_data(&csv, &tables, num_rows)?;
            if records.is_empty() {
                return Err(AppError::Config(format!("No table records found in {}", tables.display())));
            }

            let metrics: Vec<_> = records
                .iter()
                .enumerate()
                .map(|(i, record)| {
                    let metrics = extract_table_metrics(&FinancialTables::from_findsum_record(record));
                    tracing::debug!("Row {}: {} metrics", i, metrics.len());
                    metrics
                })
                .collect();

            let found = metrics.iter().filter(|m| !m.is_empty()).count();
            tracing::info!("Extracted metrics for {} of {} rows", found, metrics.len());

            let path = storage.save_metrics_csv(&table, &metrics, &output)?;
            tracing::info!("Wrote {}", path.display());
        }

        Command::Extract { input, model, api_key, base_url, timeout_secs, offline, name } => {
            let raw = std::fs::read_to_string(&input)?;
            let record = ResponseRecord::parse_serialized(&raw).ok_or_else(|| {
                AppError::Processing(format!("Could not parse a response record from {}", input.display()))
            })?;

            let timeout = Duration::from_secs(timeout_secs);
            let result = match (offline, api_key) {
                (true, _) => {
                    tracing::info!("Offline mode, using regex extraction");
                    fallback_extraction(&record)
                }
                (false, None) => {
                    tracing::warn!("OPENAI_API_KEY not set, using regex extraction");
                    fallback_extraction(&record)
                }
                (false, Some(key)) => {
                    let client = OpenAiClient::with_options(key, base_url, timeout)?;
                    StructuredExtractor::new(client, model)
                        .with_timeout(timeout)
                        .extract(&record)
                        .await
                }
            };

            tracing::info!(
                "Extracted {} metrics and {} context sections",
                result.metrics.len(),
                result.context.len()
            );

            let name = name.unwrap_or_else(|| {
                input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "extraction".to_string())
            });
            let paths = storage.save_extraction(&result, &name)?;
            for path in paths {
                tracing::info!("Wrote {}", path.display());
            }
        }
    }

    tracing::info!("Processing finished.");
    Ok(())
}
