use error_common::EmrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for EmrError {
    fn from(err: ConfigError) -> Self {
        EmrError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
