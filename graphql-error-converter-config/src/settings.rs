//! Converter settings as read from files and the environment

use crate::error::{SettingsError, SettingsResult};
use graphql_error_converter::options::raw_table_from_json;
use graphql_error_converter::{
    parse_config_with_warnings, ConfigWarning, ErrorConverter, FamilyRegistry, RawOptions, RawTables, RawValue,
    ShapelessPolicy,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Top-level converter settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    /// Pass every error through untouched
    pub debug: bool,

    pub logging: LoggingSettings,

    /// Handling of errors that never reached a resolver
    pub shapeless_errors: ShapelessPolicy,

    /// Fallback entry object, or the name of an error family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Value>,

    /// Partial mapping tables, merged in order
    pub mapping_tables: Vec<Value>,

    /// Custom error families: class name to extension code
    pub families: BTreeMap<String, String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log unmapped errors and entries with `logger: true`
    pub enabled: bool,

    /// Tracing filter level
    pub level: LogLevel,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LogLevel::Info,
        }
    }
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(level)
    }
}

impl ConverterSettings {
    /// Check the settings that can be checked without building a converter
    pub fn validate(&self) -> SettingsResult<()> {
        for (name, code) in &self.families {
            if name.is_empty() || code.is_empty() {
                return Err(SettingsError::ValidationError(format!(
                    "family names and codes cannot be empty (got '{}': '{}')",
                    name, code
                )));
            }
        }

        for (index, table) in self.mapping_tables.iter().enumerate() {
            if !table.is_object() {
                return Err(SettingsError::ValidationError(format!(
                    "mapping_tables[{}] must be a map of error keys to entries",
                    index
                )));
            }
        }

        Ok(())
    }

    pub fn family_registry(&self) -> FamilyRegistry {
        self.families
            .iter()
            .fold(FamilyRegistry::default(), |registry, (name, code)| {
                registry.register(name.clone(), code.clone())
            })
    }

    /// Loosely-typed converter options described by these settings
    pub fn to_raw_options(&self) -> SettingsResult<RawOptions> {
        let mut options = RawOptions::new().with_families(self.family_registry());

        if !self.logging.enabled {
            options = options.with_logger(Value::Bool(false));
        }

        options.fallback = self.fallback.as_ref().map(|fallback| match fallback {
            Value::String(class_name) => RawValue::Class(class_name.clone()),
            other => RawValue::Json(other.clone()),
        });

        if !self.mapping_tables.is_empty() {
            let tables = self
                .mapping_tables
                .iter()
                .map(raw_table_from_json)
                .collect::<Result<Vec<_>, _>>()?;
            options.mapping_table = Some(RawTables::List(tables));
        }

        Ok(options)
    }

    /// Build a converter, returning any options that were replaced by defaults
    pub fn build_converter_with_warnings(&self) -> SettingsResult<(ErrorConverter, Vec<ConfigWarning>)> {
        let options = self.to_raw_options()?;
        let (config, warnings) = parse_config_with_warnings(&options)?;
        let config = config
            .with_debug(self.debug)
            .with_shapeless_policy(self.shapeless_errors);

        Ok((ErrorConverter::from_config(config), warnings))
    }

    pub fn build_converter(&self) -> SettingsResult<ErrorConverter> {
        self.build_converter_with_warnings()
            .map(|(converter, _)| converter)
    }
}
