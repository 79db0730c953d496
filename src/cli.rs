//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// KuScope - knowledge-unit skill charts for analyzed repositories
///
/// Fetches detected knowledge units from the analysis service, aggregates
/// file and author counts per KU, and writes a chart-ready report.
///
/// Examples:
///   kuscope
///   kuscope --server http://localhost:5000 --format chartjs -o chart.json
///   kuscope --input detected_kus.json --authors
///   kuscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the analysis service
    ///
    /// Defaults to http://localhost:5000 or the value in .kuscope.toml.
    #[arg(short, long, value_name = "URL", env = "KUSCOPE_SERVER")]
    pub server: Option<String>,

    /// Path of the detected-KU endpoint on the service
    #[arg(long, value_name = "PATH")]
    pub endpoint: Option<String>,

    /// Read records from a JSON file instead of the service
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["server", "endpoint"])]
    pub input: Option<PathBuf>,

    /// Output file path for the report ("-" for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, chartjs)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .kuscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retries on transient service failures
    #[arg(long, value_name = "COUNT")]
    pub retries: Option<usize>,

    /// List author names per KU in the Markdown report
    #[arg(long)]
    pub authors: bool,

    /// Exit with code 2 when no knowledge units were detected
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Generate a default .kuscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Chart.js bar chart configuration
    Chartjs,
}

impl OutputFormat {
    /// File extension conventionally used for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json | OutputFormat::Chartjs => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref server) = self.server {
            if !server.starts_with("http://") && !server.starts_with("https://") {
                return Err("Server URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
