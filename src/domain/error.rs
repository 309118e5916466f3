//! Domain error types.

/// Top-level error type for fimate.
#[derive(Debug, thiserror::Error)]
pub enum FimateError {
    #[error("insufficient data: have {rows} rows, need at least {minimum}")]
    InsufficientData { rows: usize, minimum: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("invalid price data: {reason}")]
    InvalidData { reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FimateError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        FimateError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        FimateError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// True for the one failure the optimizer recovers from locally.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, FimateError::InsufficientData { .. })
    }
}

impl From<&FimateError> for std::process::ExitCode {
    fn from(err: &FimateError) -> Self {
        let code: u8 = match err {
            FimateError::Io(_) | FimateError::Report { .. } => 1,
            FimateError::ConfigParse { .. }
            | FimateError::ConfigMissing { .. }
            | FimateError::ConfigInvalid { .. } => 2,
            FimateError::DataSource { .. } => 3,
            FimateError::InvalidParameter { .. } => 4,
            FimateError::InsufficientData { .. } | FimateError::InvalidData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = FimateError::InsufficientData {
            rows: 3,
            minimum: 10,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: have 3 rows, need at least 10"
        );
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn invalid_parameter_message() {
        let err = FimateError::invalid_parameter("sma_fast", "window must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid parameter sma_fast: window must be at least 1"
        );
        assert!(!err.is_insufficient_data());
    }

    #[test]
    fn config_invalid_message() {
        let err = FimateError::config_invalid("data", "start_date", "bad date");
        assert_eq!(err.to_string(), "invalid config value [data] start_date: bad date");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FimateError = io.into();
        assert!(matches!(err, FimateError::Io(_)));
    }
}
