//! Settings error types

use graphql_error_converter::ConverterError;
use thiserror::Error;

/// Settings result type
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// IO error reading the settings file
    #[error("Failed to read settings file: {0}")]
    FileReadError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Validation error
    #[error("Invalid settings: {0}")]
    ValidationError(String),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvError(String),

    /// The mapping configuration was rejected by the converter
    #[error("Converter configuration error: {0}")]
    Converter(#[from] ConverterError),
}
