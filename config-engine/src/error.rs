use error_common::{codes, ErrorCategory, ErrorClassification};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    SourceNotFound(String),

    #[error("Configuration parsing failed: {0}")]
    ParseError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl ErrorClassification for ConfigError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }

    fn code(&self) -> &'static str {
        codes::configuration::INVALID_CONFIG
    }
}
