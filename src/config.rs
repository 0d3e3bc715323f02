//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.trendz.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".trendz.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Where the exports are read from.
    #[serde(default)]
    pub input: InputConfig,

    /// Export file format.
    #[serde(default)]
    pub format: FormatConfig,

    /// Result rendering.
    #[serde(default)]
    pub output: OutputConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Input location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory holding the CSV exports.
    /// Defaults to `Data` next to the executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// File extension to pick up, matched case-insensitively.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            extension: default_extension(),
        }
    }
}

fn default_extension() -> String {
    "csv".to_string()
}

/// Export header and value rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Required first line.
    #[serde(default = "default_category_line")]
    pub category_line: String,

    /// Required prefix of the third line (case-insensitive).
    #[serde(default = "default_header_prefix")]
    pub header_prefix: String,

    /// Values starting with this are treated as censored.
    #[serde(default = "default_censored_prefix")]
    pub censored_prefix: String,

    /// Numeric value substituted for censored cells.
    #[serde(default)]
    pub censored_value: f64,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            category_line: default_category_line(),
            header_prefix: default_header_prefix(),
            censored_prefix: default_censored_prefix(),
            censored_value: 0.0,
        }
    }
}

fn default_category_line() -> String {
    "Category: All categories".to_string()
}

fn default_header_prefix() -> String {
    "month,".to_string()
}

fn default_censored_prefix() -> String {
    "<".to_string()
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Decimal places shown for the z-score.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}

fn default_precision() -> usize {
    2
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
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.data_dir {
            self.input.data_dir = Some(dir.clone());
        }

        if let Some(precision) = args.precision {
            self.output.precision = precision;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// The data directory to scan.
    ///
    /// Falls back to `Data` beside the executable, then `./Data`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.input.data_dir {
            return dir.clone();
        }

        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join("Data")))
            .unwrap_or_else(|| PathBuf::from("Data"))
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
