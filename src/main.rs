//! KuScope - knowledge-unit skill charts
//!
//! A CLI tool that fetches detected knowledge units from the repository
//! analysis service, aggregates file and author counts per KU, and
//! writes a chart-ready report.
//!
//! Exit codes:
//!   0 - Success (including an empty result)
//!   1 - Runtime error (config, fetch failure, write failure, etc.)
//!   2 - No knowledge units detected and --fail-on-empty set

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod service;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, GeneralConfig, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::{AnalysisRecord, KuReport, ReportMetadata};
use service::ServiceClient;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("KuScope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .kuscope.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so `--output -` keeps stdout clean.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Fetch, aggregate and write the report. Returns exit code (0 or 2).
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let output_path = resolve_output(&args, &config.general);
    let to_stdout = output_path == Path::new("-");
    let announce = !args.quiet && !to_stdout;

    // Step 1: Obtain the records. A failure here means no report at all.
    let (records, source) = obtain_records(&args, &config, announce).await?;

    // Step 2: Aggregate, rank and build the series
    let output = analysis::run_pipeline(&records);
    info!(
        "Aggregated {} records into {} KUs",
        records.len(),
        output.series.len()
    );

    let metadata = ReportMetadata {
        source,
        generated_at: Utc::now(),
        records_processed: records.len(),
        kus_detected: output.stats.len(),
        skipped_values: output.skipped,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = KuReport::new(metadata, &output.stats, output.series);

    // Step 3: Render and write
    let rendered = match args.format {
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Chartjs => report::generate_chartjs_report(&report)?,
    };
    write_output(&output_path, &rendered)?;

    if announce {
        println!("\n📊 Organization Skills:");
        println!("   Records processed: {}", report.metadata.records_processed);
        println!("   Knowledge units: {}", report.metadata.kus_detected);
        if let Some(row) = report.most_files() {
            println!("   Most files: {} ({})", row.ku, row.file_count);
        }
        if let Some(row) = report.most_authors() {
            println!("   Most authors: {} ({})", row.ku, row.author_count);
        }
        if report.metadata.skipped_values > 0 {
            println!("   Ignored values: {}", report.metadata.skipped_values);
        }
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    if args.fail_on_empty && report.series.is_empty() {
        eprintln!("\n⛔ No knowledge units detected. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Load records from the input file or the analysis service.
///
/// Returns the records and a description of where they came from.
async fn obtain_records(
    args: &Args,
    config: &Config,
    show_progress: bool,
) -> Result<(Vec<AnalysisRecord>, String)> {
    if let Some(ref path) = args.input {
        let records = service::load_records_from_file(path).await?;
        return Ok((records, path.display().to_string()));
    }

    let client = ServiceClient::new(&config.service)?;
    let url = client.records_url();

    let spinner = show_progress.then(|| fetch_spinner(&url));
    let result = client.fetch_records().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let records = result.with_context(|| format!("Failed to fetch records from {}", url))?;
    Ok((records, url))
}

fn fetch_spinner(url: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Fetching detected KUs from {}", url));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Pick the output path, matching the default file's extension to the format.
fn resolve_output(args: &Args, general: &GeneralConfig) -> PathBuf {
    let path = PathBuf::from(&general.output);

    if args.output.is_none() && general.output == GeneralConfig::default().output {
        return path.with_extension(args.format.extension());
    }

    path
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if path == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(content.as_bytes())
            .context("Failed to write report to stdout")?;
        return stdout.flush().context("Failed to flush stdout");
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
