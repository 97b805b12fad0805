//! Tracing subscriber setup.
//!
//! Logs are pretty-printed for terminals or emitted as one JSON object per
//! line, on stderr or appended to a file.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::LoggingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Multi-line human-readable events.
    Console,
    /// One JSON object per event.
    Json,
}

impl FromStr for TracingFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(TracingFormat::Console),
            "json" => Ok(TracingFormat::Json),
            other => Err(format!("Unknown log format: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// An `EnvFilter` directive such as `info` or `alsvid_engine=debug`.
    pub log_level: String,
    pub format: TracingFormat,
    /// Service name recorded on the startup event.
    pub service_name: String,
    /// Log file; stderr when `None`.
    pub log_file: Option<PathBuf>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: TracingFormat::Console,
            service_name: "alsvid".to_string(),
            log_file: None,
        }
    }
}

impl TracingConfig {
    pub fn new(
        log_level: String,
        format: TracingFormat,
        service_name: String,
        log_file: Option<PathBuf>,
    ) -> Self {
        Self {
            log_level,
            format,
            service_name,
            log_file,
        }
    }
}

impl From<&LoggingConfig> for TracingConfig {
    /// Unknown formats fall back to console; [`LoggingConfig`] is validated
    /// before it gets here.
    fn from(logging: &LoggingConfig) -> Self {
        Self {
            log_level: logging.level.clone(),
            format: logging.format.parse().unwrap_or(TracingFormat::Console),
            log_file: logging.file.clone(),
            ..Self::default()
        }
    }
}

fn fmt_layer<W>(
    format: TracingFormat,
    writer: W,
    ansi: bool,
) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'a> fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    match format {
        TracingFormat::Console => fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .boxed(),
        TracingFormat::Json => fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .boxed(),
    }
}

/// Install the global subscriber.
///
/// An unparsable level falls back to `RUST_LOG`, then to `info`. Fails if the
/// log file cannot be opened or a subscriber is already set.
pub fn init_tracing(config: TracingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            fmt_layer(config.format, Mutex::new(file), false)
        }
        None => fmt_layer(config.format, std::io::stderr, true),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .try_init()?;

    tracing::info!(
        service = %config.service_name,
        format = ?config.format,
        "Tracing initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, TracingFormat::Console);
        assert_eq!(config.service_name, "alsvid");
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_from_logging_config() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
            file: Some(PathBuf::from("alsvid.log")),
        };
        let config = TracingConfig::from(&logging);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format, TracingFormat::Json);
        assert_eq!(config.log_file, Some(PathBuf::from("alsvid.log")));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("console".parse::<TracingFormat>().unwrap(), TracingFormat::Console);
        assert_eq!("json".parse::<TracingFormat>().unwrap(), TracingFormat::Json);
        assert!("xml".parse::<TracingFormat>().is_err());
    }
}
