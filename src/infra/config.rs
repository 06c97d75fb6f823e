//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. ROUTE_AUDIT_CONFIG environment variable
//! 3. Default: config/route-audit.toml
//!
//! Every section is optional; a missing file falls back to defaults.

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Path value meaning stdin (input) or stdout (output)
pub const STDIO_PATH: &str = "-";

const DEFAULT_CONFIG_PATH: &str = "config/route-audit.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// JSONL route file, "-" for stdin
    #[serde(default = "default_stdio")]
    pub path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { path: default_stdio() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// JSONL report file, "-" for stdout
    #[serde(default = "default_stdio")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { path: default_stdio() }
    }
}

fn default_stdio() -> String {
    STDIO_PATH.to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuditConfig {
    /// Routes with more visits are rejected unaudited (0 = unlimited)
    #[serde(default)]
    pub max_visits_per_route: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Colored pass/fail lines for self-check
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { color: default_color() }
    }
}

fn default_color() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MetricsConfig {
    /// Log a metrics summary every N routes (0 = only at end of run)
    #[serde(default)]
    pub summary_every: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    input_path: String,
    output_path: String,
    max_visits_per_route: usize,
    color: bool,
    log_level: String,
    log_format: LogFormat,
    summary_every: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default".to_string())
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: String) -> Self {
        Self {
            input_path: toml_config.input.path,
            output_path: toml_config.output.path,
            max_visits_per_route: toml_config.audit.max_visits_per_route,
            color: toml_config.report.color,
            log_level: toml_config.logging.level,
            log_format: toml_config.logging.format,
            summary_every: toml_config.metrics.summary_every,
            config_file,
        }
    }

    /// Determine config file path from the CLI value or environment
    pub fn resolve_config_path(cli_path: Option<&str>) -> String {
        if let Some(path) = cli_path {
            return path.to_string();
        }

        if let Ok(path) = env::var("ROUTE_AUDIT_CONFIG") {
            return path;
        }

        DEFAULT_CONFIG_PATH.to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml_str(&content, path.display().to_string())
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn from_toml_str(content: &str, config_file: String) -> anyhow::Result<Self> {
        let toml_config: TomlConfig = toml::from_str(content)?;
        Ok(Self::from_toml(toml_config, config_file))
    }

    /// Load configuration - tries TOML file first, falls back to defaults.
    ///
    /// Runs before logging is initialized, so the fallback warning goes to stderr.
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {:#}. Using defaults.", e);
                Self::default()
            }
        }
    }

    // Getters
    pub fn input_path(&self) -> &str {
        &self.input_path
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    pub fn max_visits_per_route(&self) -> usize {
        self.max_visits_per_route
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    pub fn summary_every(&self) -> u64 {
        self.summary_every
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    // CLI overrides
    pub fn with_input_path(mut self, path: impl Into<String>) -> Self {
        self.input_path = path.into();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_max_visits_per_route(mut self, max: usize) -> Self {
        self.max_visits_per_route = max;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}
