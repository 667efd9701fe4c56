//! Settings loading and environment variable handling

use crate::error::{SettingsError, SettingsResult};
use crate::settings::{ConverterSettings, LogLevel};
use graphql_error_converter::ShapelessPolicy;
use std::path::Path;
use std::str::FromStr;

/// Settings loader with environment variable support
pub struct SettingsLoader {
    /// Environment variable prefix
    prefix: String,
}

impl SettingsLoader {
    /// Create a new loader with the default prefix
    pub fn new() -> Self {
        Self {
            prefix: "ERROR_CONVERTER".to_string(),
        }
    }

    /// Create a new loader with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load settings from a YAML (or `.json`) file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> SettingsResult<ConverterSettings> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let mut settings: ConverterSettings = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        self.apply_env_overrides(&mut settings)?;
        settings.validate()?;

        tracing::debug!(path = %path.display(), tables = settings.mapping_tables.len(), "loaded converter settings");
        Ok(settings)
    }

    /// Load settings from environment variables only
    pub fn from_env(&self) -> SettingsResult<ConverterSettings> {
        let mut settings = ConverterSettings::default();
        self.apply_env_overrides(&mut settings)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from a file when one is given, otherwise from the environment
    pub fn load(&self, path: Option<impl AsRef<Path>>) -> SettingsResult<ConverterSettings> {
        match path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to settings
    fn apply_env_overrides(&self, settings: &mut ConverterSettings) -> SettingsResult<()> {
        if let Ok(debug) = self.get_env_var("DEBUG") {
            settings.debug = debug
                .parse()
                .map_err(|e| SettingsError::EnvError(format!("Invalid DEBUG: {}", e)))?;
        }

        if let Ok(enabled) = self.get_env_var("LOG_ENABLED") {
            settings.logging.enabled = enabled
                .parse()
                .map_err(|e| SettingsError::EnvError(format!("Invalid LOG_ENABLED: {}", e)))?;
        }

        if let Ok(level) = self.get_env_var("LOG_LEVEL") {
            settings.logging.level = LogLevel::from_str(&level)
                .map_err(|_| SettingsError::EnvError(format!("Invalid LOG_LEVEL: {}", level)))?;
        }

        if let Ok(policy) = self.get_env_var("SHAPELESS_ERRORS") {
            settings.shapeless_errors = match policy.to_lowercase().as_str() {
                "pass_through" => ShapelessPolicy::PassThrough,
                "convert" => ShapelessPolicy::Convert,
                _ => {
                    return Err(SettingsError::EnvError(format!(
                        "Invalid SHAPELESS_ERRORS: {}",
                        policy
                    )))
                }
            };
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}
