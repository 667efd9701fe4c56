//! Configuration for graphql-error-converter
//!
//! Loads converter settings from YAML or JSON files with environment
//! variable overrides, and sets up console tracing.

pub mod error;
pub mod init;
pub mod loader;
pub mod settings;

// Re-export main types
pub use error::{SettingsError, SettingsResult};
pub use init::{init_simple_tracing, init_tracing};
pub use loader::SettingsLoader;
pub use settings::{ConverterSettings, LogLevel, LoggingSettings};
