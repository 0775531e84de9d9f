//! Domain error types.

use crate::domain::universe::UniverseError;
use chrono::{DateTime, Utc};

/// Top-level error type for crosstrader.
///
/// The `Display` text is what the operator sees when a cycle fails, so every
/// message is written to stand on its own.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
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
    Universe(#[from] UniverseError),

    #[error("history unavailable for {symbol}: {reason}")]
    History { symbol: String, reason: String },

    #[error("broker {operation} failed: {reason}")]
    Broker { operation: String, reason: String },

    #[error("notification failed: {reason}")]
    Notify { reason: String },

    #[error("executed after market open (now {now}, open {open})")]
    MissedMarketOpen {
        now: DateTime<Utc>,
        open: DateTime<Utc>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraderError {
    pub fn broker(operation: &str, reason: impl ToString) -> Self {
        TraderError::Broker {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn history(symbol: &str, reason: impl ToString) -> Self {
        TraderError::History {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. }
            | TraderError::Universe(_) => 2,
            TraderError::History { .. } => 3,
            TraderError::Broker { .. } => 4,
            TraderError::MissedMarketOpen { .. } => 5,
            TraderError::Notify { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
