//! Domain error types.

/// Top-level error type for eodtrader.
#[derive(Debug, thiserror::Error)]
pub enum EodtraderError {
    #[error("market data error: {reason}")]
    MarketData { reason: String },

    #[error("brokerage error: {reason}")]
    Brokerage { reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

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

impl From<&EodtraderError> for std::process::ExitCode {
    fn from(err: &EodtraderError) -> Self {
        let code: u8 = match err {
            EodtraderError::Io(_) => 1,
            EodtraderError::ConfigParse { .. }
            | EodtraderError::ConfigMissing { .. }
            | EodtraderError::ConfigInvalid { .. } => 2,
            EodtraderError::Database { .. } | EodtraderError::DatabaseQuery { .. } => 3,
            EodtraderError::MarketData { .. } => 4,
            EodtraderError::Brokerage { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
