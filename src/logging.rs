//! Tracing subscriber setup for the binary.

use crate::domain::error::FimateError;
use crate::ports::config_port::ConfigPort;

pub const LOG_ENV_VAR: &str = "FIMATE_LOG";
pub const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self, FimateError> {
        match value.trim().to_lowercase().as_str() {
            "" | "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(FimateError::config_invalid(
                "logging",
                "format",
                format!("unknown log format '{}' (expected text or json)", other),
            )),
        }
    }
}

/// Reads `[logging] level` and `format` and installs the subscriber.
pub fn init_from_config(config: &dyn ConfigPort) -> Result<(), FimateError> {
    let level = config
        .get_non_empty("logging", "level")
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    let format = LogFormat::parse(&config.get_non_empty("logging", "format").unwrap_or_default())?;
    init_tracing(&level, format)
}

/// Installs a stderr subscriber. `FIMATE_LOG` takes precedence over `level`.
///
/// A subscriber that is already installed is left in place.
pub fn init_tracing(level: &str, format: LogFormat) -> Result<(), FimateError> {
    let filter = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter).map_err(|err| {
        FimateError::config_invalid("logging", "level", format!("invalid log filter: {err}"))
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn parses_formats() {
        assert_eq!(LogFormat::parse("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::parse("text").unwrap(), LogFormat::Text);
        assert_eq!(LogFormat::parse("").unwrap(), LogFormat::Text);
    }

    #[test]
    fn unknown_format_is_config_invalid() {
        let err = LogFormat::parse("xml").unwrap_err();
        assert!(matches!(err, FimateError::ConfigInvalid { key, .. } if key == "format"));
    }

    #[test]
    fn init_twice_is_ok() {
        assert!(init_tracing("warn", LogFormat::Text).is_ok());
        assert!(init_tracing("debug", LogFormat::Json).is_ok());
    }

    #[test]
    fn init_from_config_rejects_bad_format() {
        let config = FileConfigAdapter::from_string("[logging]\nformat = yaml\n").unwrap();
        assert!(init_from_config(&config).is_err());
    }
}
