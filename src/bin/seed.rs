//! Seed CLI - Command-line interface for Synheart Seed
//!
//! Commands:
//! - backfill: Generate and insert historical records into a file store
//! - live: Run the continuous live heart-rate seeder until Ctrl-C
//! - read: Query a store over a time range
//! - plan: Print the segmentation plan for a window without inserting

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{Duration, Local, Utc};
use tokio_util::sync::CancellationToken;

use synheart_seed::pipeline::SeedEngine;
use synheart_seed::request::{record_to_map, records_response, RangeRequest};
use synheart_seed::segment::{sample_ticks, windows};
use synheart_seed::{JsonFileStore, SeedConfig, SeedError, SEED_VERSION};

/// Seed - On-device synthetic biosignal seeding engine
#[derive(Parser)]
#[command(name = "seed")]
#[command(author = "Synheart AI Inc")]
#[command(version = SEED_VERSION)]
#[command(about = "Seed synthetic biosignals into a health-data store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and insert historical records into a file store
    Backfill {
        /// Path of the NDJSON store file
        #[arg(short, long)]
        store: PathBuf,

        /// RFC 3339 window start (defaults to end minus --days)
        #[arg(long)]
        start: Option<String>,

        /// RFC 3339 window end (defaults to now)
        #[arg(long)]
        end: Option<String>,

        /// Days of history when --start is omitted
        #[arg(long, default_value = "7")]
        days: i64,

        /// Metric kinds to seed
        #[arg(
            long,
            value_delimiter = ',',
            default_values = ["heart_rate", "heart_rate_variability", "skin_temperature"]
        )]
        kinds: Vec<String>,

        /// Records per insert chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Fixed RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the continuous live heart-rate seeder until Ctrl-C
    Live {
        /// Path of the NDJSON store file
        #[arg(short, long)]
        store: PathBuf,
    },

    /// Query a store over a time range
    Read {
        /// Path of the NDJSON store file
        #[arg(short, long)]
        store: PathBuf,

        /// RFC 3339 window start
        #[arg(long)]
        start: String,

        /// RFC 3339 window end
        #[arg(long)]
        end: String,

        /// Metric kinds to read
        #[arg(
            long,
            value_delimiter = ',',
            default_values = ["heart_rate", "heart_rate_variability", "skin_temperature"]
        )]
        kinds: Vec<String>,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Print the segmentation plan for a window without inserting
    Plan {
        /// RFC 3339 window start (defaults to end minus --days)
        #[arg(long)]
        start: Option<String>,

        /// RFC 3339 window end (defaults to now)
        #[arg(long)]
        end: Option<String>,

        /// Days of history when --start is omitted
        #[arg(long, default_value = "7")]
        days: i64,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one record map per line)
    Ndjson,
    /// JSON object grouped by kind
    Json,
    /// Pretty-printed JSON grouped by kind
    JsonPretty,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), SeedCliError> {
    match cli.command {
        Commands::Backfill {
            store,
            start,
            end,
            days,
            kinds,
            chunk_size,
            seed,
        } => cmd_backfill(&store, start, end, days, kinds, chunk_size, seed).await,

        Commands::Live { store } => cmd_live(&store).await,

        Commands::Read {
            store,
            start,
            end,
            kinds,
            output_format,
        } => cmd_read(&store, start, end, kinds, output_format).await,

        Commands::Plan { start, end, days } => cmd_plan(start, end, days),
    }
}

/// Resolve the (start, end) strings: explicit values win, otherwise the
/// window is the trailing `days` ending now.
fn resolve_window(
    start: Option<String>,
    end: Option<String>,
    days: i64,
) -> (String, String) {
    let end = end.unwrap_or_else(|| Utc::now().to_rfc3339());
    let start = start.unwrap_or_else(|| {
        let parsed_end = chrono::DateTime::parse_from_rfc3339(&end)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        (parsed_end - Duration::days(days)).to_rfc3339()
    });
    (start, end)
}

/// Cancel the returned token on Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });
    token
}

async fn cmd_backfill(
    store: &PathBuf,
    start: Option<String>,
    end: Option<String>,
    days: i64,
    kinds: Vec<String>,
    chunk_size: Option<usize>,
    seed: Option<u64>,
) -> Result<(), SeedCliError> {
    let mut config = SeedConfig::default();
    if let Some(chunk_size) = chunk_size {
        config.chunk_size = chunk_size;
    }
    config.rng_seed = seed;

    let store = Arc::new(JsonFileStore::new(store));
    let engine = SeedEngine::new(store, config)?;
    let cancel = cancel_on_ctrl_c();

    let (start, end) = resolve_window(start, end, days);
    let request = RangeRequest::new(start, end, kinds);
    let report = engine.seed_history(&request, &cancel).await?;

    println!(
        "Seeded {} records in {} chunks (run {})",
        report.records_committed, report.chunks_committed, report.run_id
    );
    for (kind, generated) in &report.records_generated {
        println!("  {}: {} records generated", kind.as_str(), generated);
    }
    if report.cancelled {
        println!("Run cancelled; committed chunks were kept");
    }
    Ok(())
}

async fn cmd_live(store: &PathBuf) -> Result<(), SeedCliError> {
    let store = Arc::new(JsonFileStore::new(store));
    let engine = SeedEngine::new(store, SeedConfig::default())?;
    let cancel = cancel_on_ctrl_c();

    println!("Live seeding started; press Ctrl-C to stop");
    let report = engine.live_seed(&cancel).await;

    println!(
        "Live seeding stopped: {} records seeded, {} insert failures",
        report.records_seeded, report.insert_failures
    );
    Ok(())
}

async fn cmd_read(
    store: &PathBuf,
    start: String,
    end: String,
    kinds: Vec<String>,
    output_format: OutputFormat,
) -> Result<(), SeedCliError> {
    let store = Arc::new(JsonFileStore::new(store));
    let engine = SeedEngine::new(store, SeedConfig::default())?;

    let request = RangeRequest::new(start, end, kinds);
    let grouped = engine.read_records(&request).await?;

    match output_format {
        OutputFormat::Ndjson => {
            for records in grouped.values() {
                for record in records {
                    println!("{}", serde_json::to_string(&record_to_map(record))?);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&records_response(&grouped))?);
        }
        OutputFormat::JsonPretty => {
            println!(
                "{}",
                serde_json::to_string_pretty(&records_response(&grouped))?
            );
        }
    }
    Ok(())
}

fn cmd_plan(
    start: Option<String>,
    end: Option<String>,
    days: i64,
) -> Result<(), SeedCliError> {
    let config = SeedConfig::default();
    let (start, end) = resolve_window(start, end, days);
    let request = RangeRequest::new(start, end, vec!["heart_rate".to_string()]);
    let validated = request.validate()?;

    println!("Segmentation Plan");
    println!("=================");
    println!(
        "Window:   {} .. {}",
        validated.window.start.with_timezone(&Local),
        validated.window.end.with_timezone(&Local)
    );
    println!(
        "Records:  {} min span, {} min samples",
        config.record_span.num_minutes(),
        config.sample_interval.num_minutes()
    );

    let mut record_count = 0usize;
    let mut sample_count = 0usize;
    for window in windows(
        validated.window.start,
        validated.window.end,
        config.record_span,
        config.sample_interval,
    ) {
        record_count += 1;
        sample_count += sample_ticks(&window, config.sample_interval).count();
    }

    println!("\nPer kind: {record_count} records, {sample_count} samples");
    Ok(())
}

// Error types

#[derive(Debug)]
enum SeedCliError {
    Seed(SeedError),
    Json(serde_json::Error),
}

impl From<SeedError> for SeedCliError {
    fn from(e: SeedError) -> Self {
        SeedCliError::Seed(e)
    }
}

impl From<serde_json::Error> for SeedCliError {
    fn from(e: serde_json::Error) -> Self {
        SeedCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SeedCliError> for CliError {
    fn from(e: SeedCliError) -> Self {
        match e {
            SeedCliError::Seed(SeedError::InvalidConfig(message)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message,
                hint: Some("Check interval, chunk, and profile settings".to_string()),
            },
            SeedCliError::Seed(e @ SeedError::MalformedRequest { .. }) => CliError {
                code: "MALFORMED_REQUEST".to_string(),
                message: e.to_string(),
                hint: Some(
                    "Timestamps are RFC 3339; kinds are heart_rate, heart_rate_variability, skin_temperature"
                        .to_string(),
                ),
            },
            SeedCliError::Seed(e @ SeedError::StoreFailure { .. }) => CliError {
                code: "STORE_FAILURE".to_string(),
                message: e.to_string(),
                hint: Some("Records committed before the failure were kept".to_string()),
            },
            SeedCliError::Seed(e @ SeedError::Store(_)) => CliError {
                code: "STORE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the store path and its contents".to_string()),
            },
            SeedCliError::Seed(e @ SeedError::RunInProgress) => CliError {
                code: "RUN_IN_PROGRESS".to_string(),
                message: e.to_string(),
                hint: Some("Stop the pending run first".to_string()),
            },
            SeedCliError::Seed(e @ SeedError::TaskFailed(_)) => CliError {
                code: "TASK_FAILED".to_string(),
                message: e.to_string(),
                hint: None,
            },
            SeedCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
        }
    }
}
