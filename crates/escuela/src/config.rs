/// Configuration for the bootstrap run
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

/// Where to store records, where to write reports, and how loud to log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory that receives the CSV reports
    pub output_dir: PathBuf,
    /// SQLite file path, or `:memory:` for a throwaway database
    pub database: String,
    /// One of `trace`, `debug`, `info`, `warn`, `error`
    pub log_level: String,
}

impl AppConfig {
    /// Loads a JSON config file. Missing keys take their default values.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON file
    ///
    /// # Returns
    /// * `Ok(AppConfig)` - The parsed configuration
    /// * `Err` - If the file can't be read or isn't valid JSON
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    /// Parses `log_level` into a tracing level.
    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        tracing::Level::from_str(&self.log_level).map_err(|_| ConfigError::LogLevel {
            level: self.log_level.clone(),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            output_dir: PathBuf::from("."),
            database: ":memory:".to_string(),
            log_level: "info".to_string(),
        }
    }
}
