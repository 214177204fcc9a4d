//! Configuration schema (sqlineage.toml)

use serde::{Deserialize, Serialize};

/// Connection settings applied to every cached SQLite connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// How long a statement waits on a locked database (milliseconds)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Create missing parent directories of a database path
    #[serde(default = "default_true")]
    pub create_parent_dirs: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: default_busy_timeout_ms(),
            create_parent_dirs: true,
        }
    }
}

/// CSV import/export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Field delimiter (single ASCII character, never sniffed)
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

impl CsvConfig {
    /// The delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ConfigError::Invalid(format!(
                "csv.delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )))
        }
    }
}

/// Sample data generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDataConfig {
    /// Rows generated when a request does not say
    #[serde(default = "default_rows")]
    pub default_rows: usize,

    /// Fixed RNG seed for reproducible data
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SampleDataConfig {
    fn default() -> Self {
        Self {
            default_rows: default_rows(),
            seed: None,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_delimiter() -> char {
    ','
}

fn default_rows() -> usize {
    10
}

fn default_filter() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub csv: CsvConfig,

    #[serde(default)]
    pub sample_data: SampleDataConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Reject values that parse but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.csv.delimiter_byte()?;
        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
