//! Configuration errors

use thiserror::Error;

/// Errors raised while loading or validating configuration
///
/// These are the only hard failures of the planner and happen at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}: {1}")]
    FileNotFound(String, String),

    #[error("failed to parse {0}: {1}")]
    Parse(String, String),

    #[error("invalid city table: {0}")]
    InvalidCityTable(String),

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),
}
