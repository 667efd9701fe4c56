//! Error and warning types raised while building or running a converter

use std::fmt;
use thiserror::Error;

/// Converter result type
pub type ConverterResult<T> = Result<T, ConverterError>;

/// Errors raised by the converter
#[derive(Error, Debug)]
pub enum ConverterError {
    /// A mapping entry failed shape validation during configuration or extension
    #[error("Invalid mapping entry - key: [{key}] value: [{value}]")]
    InvalidMappingEntry { key: String, value: String },

    /// A configuration document could not be interpreted at all
    #[error("Invalid converter options: {0}")]
    InvalidOptions(String),

    /// A caller-supplied logger or data function failed
    #[error(transparent)]
    Hook(#[from] anyhow::Error),
}

impl ConverterError {
    pub fn invalid_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidMappingEntry {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Non-fatal configuration problems, recovered by substituting defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The named top-level option was malformed and its default was used
    InvalidOption { option: &'static str },
}

impl ConfigWarning {
    pub fn option(&self) -> &'static str {
        match self {
            ConfigWarning::InvalidOption { option } => option,
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::InvalidOption { option } => {
                write!(f, "invalid {} option, using default {}", option, option)
            }
        }
    }
}
