use thiserror::Error;

pub type BanditResult<T> = Result<T, BanditError>;

#[derive(Error, Debug)]
pub enum BanditError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Action index {index} out of range for environment with {len} actions")]
    ActionOutOfRange { index: usize, len: usize },

    #[error("Invalid best choice: {0}")]
    InvalidBestChoice(String),

    #[error("Best choice length mismatch: expected {expected} steps, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for BanditError {
    fn from(e: config::ConfigError) -> Self {
        BanditError::Config(e.to_string())
    }
}
