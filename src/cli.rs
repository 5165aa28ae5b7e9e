//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::AnalysisKind;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Surveyscope - aggregation reports over developer survey responses
///
/// Loads a survey collection, runs one (or every) analysis pipeline over
/// it, and prints tables or text charts.
///
/// Examples:
///   surveyscope --connection-string ./data
///   surveyscope --analysis tech-stack --format markdown -o report.md
///   surveyscope --all --format json
///   surveyscope --count-only
///   surveyscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Analysis to run
    #[arg(short, long, value_enum, default_value = "job-titles")]
    pub analysis: AnalysisKind,

    /// Run every analysis, in report order
    #[arg(long)]
    pub all: bool,

    /// Connection string of the survey collection
    ///
    /// A file path or file:// URI (JSON array or NDJSON, or a data root
    /// directory), or an http(s):// base URL.
    #[arg(long, value_name = "URI", env = "CONNECTION_STRING", hide_env_values = true)]
    pub connection_string: Option<String>,

    /// Database name
    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    /// Collection name
    #[arg(long, value_name = "NAME")]
    pub collection: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .surveyscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (table, markdown, json)
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of groups each analysis keeps
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Request timeout in seconds for remote sources
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress bar)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the number of records in the collection and exit
    #[arg(long)]
    pub count_only: bool,

    /// Generate a default .surveyscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Text tables and charts (default)
    #[default]
    Table,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The analyses selected on the command line.
    pub fn selected_analyses(&self) -> Vec<AnalysisKind> {
        if self.all {
            AnalysisKind::ALL.to_vec()
        } else {
            vec![self.analysis]
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref uri) = self.connection_string {
            if uri.trim().is_empty() {
                return Err("Connection string must not be empty".to_string());
            }
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        // Validate timeout if provided
        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(ref output) = self.output {
            if output.is_dir() {
                return Err(format!(
                    "Output path is a directory: {}",
                    output.display()
                ));
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
