//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.surveyscope.toml` files.

use crate::analysis::tech_stack::DEFAULT_COUNTRIES;
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".surveyscope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Pipeline settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where the survey collection lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Connection string. Usually supplied through `CONNECTION_STRING`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    /// Database name.
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection name.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Request timeout in seconds for remote sources.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            database: default_database(),
            collection: default_collection(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_database() -> String {
    "StackOverflow2022".to_string()
}

fn default_collection() -> String {
    "surveyresult".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// How many groups each analysis keeps.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Countries considered by the tech-stack analysis.
    #[serde(default = "default_countries")]
    pub countries: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            countries: default_countries(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_countries() -> Vec<String> {
    DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect()
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Width in characters of the longest bar in text charts.
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            chart_width: default_chart_width(),
        }
    }
}

fn default_chart_width() -> usize {
    40
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given on the command line (or through their environment
    /// variables) override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref uri) = args.connection_string {
            self.source.connection_string = Some(uri.clone());
        }
        if let Some(ref database) = args.database {
            self.source.database = database.clone();
        }
        if let Some(ref collection) = args.collection {
            self.source.collection = collection.clone();
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(top) = args.top {
            self.analysis.top_k = top;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.database, "StackOverflow2022");
        assert_eq!(config.source.collection, "surveyresult");
        assert_eq!(config.analysis.top_k, 5);
        assert!(config.analysis.countries.contains(&"India".to_string()));
        assert_eq!(config.report.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[source]
connection_string = "file://./data"
collection = "responses"

[analysis]
top_k = 3
countries = ["Germany"]

[report]
format = "markdown"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(
            config.source.connection_string.as_deref(),
            Some("file://./data")
        );
        assert_eq!(config.source.database, "StackOverflow2022");
        assert_eq!(config.source.collection, "responses");
        assert_eq!(config.analysis.top_k, 3);
        assert_eq!(config.analysis.countries, vec!["Germany"]);
        assert_eq!(config.report.format, OutputFormat::Markdown);
        assert_eq!(config.report.chart_width, 40);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config: Config = toml::from_str(
            r#"
[source]
connection_string = "file://./data"

[analysis]
top_k = 3
"#,
        )
        .unwrap();

        let args = Args::parse_from([
            "surveyscope",
            "--connection-string",
            "https://data.example.com",
            "--top",
            "7",
            "--format",
            "json",
        ]);
        config.merge_with_args(&args);

        assert_eq!(
            config.source.connection_string.as_deref(),
            Some("https://data.example.com")
        );
        assert_eq!(config.analysis.top_k, 7);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.source.collection, "surveyresult");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.analysis.top_k, 5);
    }
}
