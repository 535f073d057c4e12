//! Agent errors

use hotel_planner_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("unknown conversation: {0}")]
    UnknownConversation(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;
