use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(roundup::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(roundup::config))]
    Config(String),

    #[error("Invalid record {record}: {message}")]
    #[diagnostic(
        code(roundup::invalid_record),
        help("Fix the record in the calendar table and run again")
    )]
    InvalidRecord { record: String, message: String },

    #[error("Record source error: {0}")]
    #[diagnostic(code(roundup::record_source))]
    RecordSource(String),

    #[error("Image rendering error: {0}")]
    #[diagnostic(code(roundup::render))]
    Render(String),

    #[error("Publishing error: {0}")]
    #[diagnostic(code(roundup::publish))]
    Publish(String),

    #[error(transparent)]
    #[diagnostic(code(roundup::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(roundup::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(roundup::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type RoundupResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create errors for records that violate the expected shape
pub fn invalid_record(record: &str, message: &str) -> Error {
    let record = if record.is_empty() { "<no id>" } else { record };
    Error::InvalidRecord {
        record: record.to_string(),
        message: message.to_string(),
    }
}

/// Helper to create record source errors
pub fn record_source_error(message: &str) -> Error {
    Error::RecordSource(message.to_string())
}

/// Helper to create rendering errors
pub fn render_error(message: &str) -> Error {
    Error::Render(message.to_string())
}

/// Helper to create publishing errors
pub fn publish_error(message: &str) -> Error {
    Error::Publish(message.to_string())
}
