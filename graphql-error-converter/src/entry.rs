//! Mapping entries: how one class of error is converted

use crate::error::{ConverterError, ConverterResult};
use crate::family::{ErrorFamily, FamilyRegistry};
use crate::original::OriginalError;
use crate::shape::{RawEntry, RawValue, Validator};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A logging function receiving the original error
#[derive(Clone)]
pub struct LogFn(Arc<dyn Fn(&OriginalError) -> anyhow::Result<()> + Send + Sync>);

impl LogFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&OriginalError) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, error: &OriginalError) -> anyhow::Result<()> {
        (self.0)(error)
    }

    pub fn ptr_eq(&self, other: &LogFn) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for LogFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LogFn")
    }
}

/// A function deriving structured data from the original error
#[derive(Clone)]
pub struct DataFn(Arc<dyn Fn(&OriginalError) -> anyhow::Result<Value> + Send + Sync>);

impl DataFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&OriginalError) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, error: &OriginalError) -> anyhow::Result<Value> {
        (self.0)(error)
    }
}

impl fmt::Debug for DataFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataFn")
    }
}

/// Logger that reports the original error through `tracing`
pub fn default_logger() -> LogFn {
    LogFn::new(|error| {
        tracing::error!(
            error.name = error.name(),
            error.code = error.code(),
            error.kind = error.error_type(),
            error.class = error.class_name(),
            "{}",
            error
        );
        Ok(())
    })
}

/// Structured data attached to a normalized error
#[derive(Debug, Clone)]
pub enum EntryData {
    Static(Value),
    Computed(DataFn),
}

impl EntryData {
    pub fn resolve(&self, error: &OriginalError) -> anyhow::Result<Value> {
        match self {
            EntryData::Static(value) => Ok(value.clone()),
            EntryData::Computed(data) => data.call(error),
        }
    }
}

/// Per-entry logging choice
#[derive(Debug, Clone)]
pub enum EntryLogger {
    /// Use the converter's configured logger
    Default,
    /// Do not log errors matched by this entry
    Disabled,
    Custom(LogFn),
}

/// Conversion rule for one class of error
#[derive(Debug, Clone)]
pub struct MappingEntry {
    message: String,
    code: Option<String>,
    family: Option<ErrorFamily>,
    data: Option<EntryData>,
    logger: Option<EntryLogger>,
}

impl MappingEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            family: None,
            data: None,
            logger: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_family(mut self, family: ErrorFamily) -> Self {
        self.family = Some(family);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(EntryData::Static(data));
        self
    }

    pub fn with_data_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&OriginalError) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.data = Some(EntryData::Computed(DataFn::new(f)));
        self
    }

    pub fn with_logger(mut self, logger: EntryLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn family(&self) -> Option<&ErrorFamily> {
        self.family.as_ref()
    }

    pub fn data(&self) -> Option<&EntryData> {
        self.data.as_ref()
    }

    pub fn logger(&self) -> Option<&EntryLogger> {
        self.logger.as_ref()
    }

    /// Outgoing code: explicit code, then the family's, then the internal error code
    pub fn effective_code(&self) -> &str {
        self.code
            .as_deref()
            .or_else(|| self.family.as_ref().map(ErrorFamily::code))
            .unwrap_or(crate::family::INTERNAL_SERVER_ERROR)
    }

    /// Build a typed entry from a raw one that already passed validation
    pub(crate) fn from_validated(raw: &RawEntry, families: &FamilyRegistry) -> Self {
        let message = match raw.get("message") {
            Some(RawValue::Json(Value::String(message))) => message.clone(),
            _ => String::new(),
        };

        let code = match raw.get("code") {
            Some(RawValue::Json(Value::String(code))) => Some(code.clone()),
            _ => None,
        };

        let family = match raw.get("family") {
            Some(RawValue::Class(name)) | Some(RawValue::Json(Value::String(name))) => {
                families.lookup(name).cloned()
            }
            _ => None,
        };

        let data = match raw.get("data") {
            Some(RawValue::Data(data)) => Some(EntryData::Computed(data.clone())),
            Some(RawValue::Json(value)) => Some(EntryData::Static(value.clone())),
            _ => None,
        };

        let logger = match raw.get("logger") {
            Some(RawValue::Logger(logger)) => Some(EntryLogger::Custom(logger.clone())),
            Some(RawValue::Json(Value::Bool(true))) => Some(EntryLogger::Default),
            Some(RawValue::Json(Value::Bool(false))) => Some(EntryLogger::Disabled),
            _ => None,
        };

        Self {
            message,
            code,
            family,
            data,
            logger,
        }
    }

    /// Validate a raw entry and convert it
    pub fn from_raw(
        key: &str,
        raw: &RawEntry,
        families: &FamilyRegistry,
    ) -> ConverterResult<Self> {
        if !Validator::new(families).is_valid_entry(raw) {
            return Err(ConverterError::invalid_entry(key, raw.describe()));
        }
        Ok(Self::from_validated(raw, families))
    }

    /// Raw form of this entry, used when extending it
    pub fn to_raw(&self) -> RawEntry {
        let mut raw = RawEntry::new().with_json("message", self.message.clone());

        if let Some(code) = &self.code {
            raw.insert("code", RawValue::Json(Value::String(code.clone())));
        }
        if let Some(family) = &self.family {
            raw.insert("family", RawValue::Class(family.name().to_string()));
        }
        match &self.data {
            Some(EntryData::Static(value)) => raw.insert("data", RawValue::Json(value.clone())),
            Some(EntryData::Computed(data)) => raw.insert("data", RawValue::Data(data.clone())),
            None => {}
        }
        match &self.logger {
            Some(EntryLogger::Default) => raw.insert("logger", RawValue::Json(Value::Bool(true))),
            Some(EntryLogger::Disabled) => raw.insert("logger", RawValue::Json(Value::Bool(false))),
            Some(EntryLogger::Custom(logger)) => raw.insert("logger", RawValue::Logger(logger.clone())),
            None => {}
        }

        raw
    }
}

/// Copy `base`, lay `patch` over it and validate the result; `base` is untouched
pub fn extend_entry(
    base: &MappingEntry,
    patch: &RawEntry,
    families: &FamilyRegistry,
) -> ConverterResult<MappingEntry> {
    let merged = base.to_raw().overlay(patch);
    MappingEntry::from_raw("extension", &merged, families)
}

/// Ready-made entries for common error classes
pub mod bases {
    use super::MappingEntry;

    pub fn invalid_fields() -> MappingEntry {
        MappingEntry::new("Invalid Field Values").with_code("INVALID_FIELDS")
    }

    pub fn unique_constraint() -> MappingEntry {
        MappingEntry::new("Unique Constraint Violation").with_code("UNIQUE_CONSTRAINT")
    }
}

/// Empty structured value used when an entry has no data
pub(crate) fn empty_data() -> Value {
    Value::Object(Map::new())
}
