//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for cyc.
#[derive(Debug, thiserror::Error)]
pub enum CycError {
    #[error("invalid date range '{input}': {reason}")]
    InvalidRange { input: String, reason: String },

    #[error("invalid time string '{input}': {reason}")]
    InvalidTime { input: String, reason: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("date {date} has no trading day within the supported calendar range")]
    DateOutOfRange { date: NaiveDate },

    #[error("no data for {symbol} on {date}")]
    MissingData { symbol: String, date: NaiveDate },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CycError {
    pub(crate) fn invalid_range(input: &str, reason: impl Into<String>) -> Self {
        CycError::InvalidRange {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_time(input: &str, reason: impl Into<String>) -> Self {
        CycError::InvalidTime {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&CycError> for std::process::ExitCode {
    fn from(err: &CycError) -> Self {
        let code: u8 = match err {
            CycError::Io(_) => 1,
            CycError::ConfigParse { .. }
            | CycError::ConfigMissing { .. }
            | CycError::ConfigInvalid { .. } => 2,
            CycError::DataSource { .. } => 3,
            CycError::InvalidRange { .. }
            | CycError::InvalidTime { .. }
            | CycError::InvalidInput { .. }
            | CycError::DateOutOfRange { .. } => 4,
            CycError::MissingData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
