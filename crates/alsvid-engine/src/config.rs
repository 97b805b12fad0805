//! Engine configuration.
//!
//! Values come from built-in defaults, then an optional YAML file, then
//! `ALSVID_*` environment variables (a `.env` file in the working directory
//! is loaded first). Later sources win.

use std::path::{Path, PathBuf};

use alsvid_estimation::STRATEGY_NAMES;
use serde::{Deserialize, Serialize};

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Worker pool sizing
    #[serde(default)]
    pub workers: WorkerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Defaults for estimation requests
    #[serde(default)]
    pub estimation: EstimationConfig,

    /// Defaults for combine requests
    #[serde(default)]
    pub combine: CombineConfig,
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Requested number of workers. Ignored unless it lies between 1 and the
    /// number of CPUs available to the process, so `0` means "all of them".
    #[serde(default)]
    pub max_workers: Option<usize>,
}

/// Where and how the engine logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `console` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Append logs to this file instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Estimation defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationConfig {
    /// Gate set used when a request names none
    #[serde(default = "default_basis_gates")]
    pub basis_gates: Vec<String>,

    /// Grouping strategy: "greedy" or "singleton"
    #[serde(default = "default_grouping")]
    pub grouping: String,
}

/// Combine defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombineConfig {
    /// Qubit limit used when a request names none
    #[serde(default = "default_max_qubits")]
    pub max_qubits: i64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

fn default_basis_gates() -> Vec<String> {
    ["sx", "rz", "cx"].map(String::from).to_vec()
}

fn default_grouping() -> String {
    "greedy".to_string()
}

fn default_max_qubits() -> i64 {
    64
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Default for EstimationConfig {
    fn default() -> Self {
        EstimationConfig {
            basis_gates: default_basis_gates(),
            grouping: default_grouping(),
        }
    }
}

impl Default for CombineConfig {
    fn default() -> Self {
        CombineConfig {
            max_qubits: default_max_qubits(),
        }
    }
}

impl EngineConfig {
    /// Read and validate a YAML file; missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.as_ref().display())))?;

        let config: EngineConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// `.env`, then `config_file` or the defaults, then the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = if let Some(path) = config_file {
            Self::from_file(path)?
        } else {
            EngineConfig::default()
        };

        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Merge process environment variables into this configuration.
    pub fn merge_env(self) -> Self {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge variables from `lookup` into this configuration.
    ///
    /// Only variables that are set override the file-loaded (or default)
    /// values. An unparsable `ALSVID_MAX_WORKERS` is ignored.
    pub fn merge_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Workers
        if let Some(v) = lookup("ALSVID_MAX_WORKERS") {
            if let Ok(val) = v.trim().parse() {
                self.workers.max_workers = Some(val);
            }
        }

        // Logging
        if let Some(v) = lookup("ALSVID_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("ALSVID_LOG_FORMAT") {
            self.logging.format = v;
        }
        if let Some(v) = lookup("ALSVID_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(v));
        }

        // Estimation
        if let Some(v) = lookup("ALSVID_GROUPING") {
            self.estimation.grouping = v;
        }

        self
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate log level
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        // Validate log format
        match self.logging.format.as_str() {
            "console" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {other}"
                )));
            }
        }

        if !STRATEGY_NAMES.contains(&self.estimation.grouping.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Unknown grouping strategy: {} (expected one of {STRATEGY_NAMES:?})",
                self.estimation.grouping
            )));
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
