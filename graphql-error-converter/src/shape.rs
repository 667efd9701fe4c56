//! Shape validation for loosely-typed mapping entries
//!
//! Configuration that arrives as external data (JSON documents, option maps
//! assembled at runtime) is checked here field by field before it becomes a
//! typed [`MappingEntry`](crate::entry::MappingEntry).

use crate::entry::{DataFn, LogFn};
use crate::error::{ConverterError, ConverterResult};
use crate::family::FamilyRegistry;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A configuration value of unknown shape
#[derive(Clone)]
pub enum RawValue {
    Json(Value),
    Logger(LogFn),
    Data(DataFn),
    /// Reference to an error class by name
    Class(String),
    /// Structured record that may hold functions
    Entry(RawEntry),
}

impl RawValue {
    /// Short description used in error messages and warnings
    pub fn describe(&self) -> String {
        match self {
            RawValue::Json(value) => value.to_string(),
            RawValue::Logger(_) => "[logger function]".to_string(),
            RawValue::Data(_) => "[data function]".to_string(),
            RawValue::Class(name) => format!("[class {}]", name),
            RawValue::Entry(entry) => entry.describe(),
        }
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue::Json(value)
    }
}

impl From<LogFn> for RawValue {
    fn from(logger: LogFn) -> Self {
        RawValue::Logger(logger)
    }
}

impl From<DataFn> for RawValue {
    fn from(data: DataFn) -> Self {
        RawValue::Data(data)
    }
}

impl From<RawEntry> for RawValue {
    fn from(entry: RawEntry) -> Self {
        RawValue::Entry(entry)
    }
}

/// A mapping entry before validation
#[derive(Clone, Default)]
pub struct RawEntry {
    fields: BTreeMap<String, RawValue>,
}

impl RawEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an entry from a JSON object; `None` for any other JSON value
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let fields = object
            .iter()
            .map(|(key, value)| (key.clone(), RawValue::Json(value.clone())))
            .collect();
        Some(Self { fields })
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_json(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(key, RawValue::Json(value.into()))
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<RawValue> {
        self.fields.remove(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: RawValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.fields.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy of this entry with every field of `patch` laid over it
    pub fn overlay(&self, patch: &RawEntry) -> RawEntry {
        let mut merged = self.clone();
        for (key, value) in patch.iter() {
            merged.fields.insert(key.clone(), value.clone());
        }
        merged
    }

    pub fn describe(&self) -> String {
        let body = self
            .fields
            .iter()
            .map(|(key, value)| format!("\"{}\":{}", key, value.describe()))
            .collect::<Vec<_>>()
            .join(",");
        format!("{{{}}}", body)
    }
}

impl fmt::Debug for RawEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// A partial mapping table before validation, in key order
pub type RawTable = BTreeMap<String, RawEntry>;

/// Accepted kinds of value for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Object,
    Array,
    LoggerFn,
    DataFn,
    /// Name of a normalized error family
    ErrorFamily,
}

/// A field name with the kinds it may hold
#[derive(Debug, Clone, Copy)]
pub struct FieldShape {
    pub key: &'static str,
    pub kinds: &'static [FieldKind],
}

/// Fields every mapping entry must carry
pub const ENTRY_REQUIRED_FIELDS: &[FieldShape] = &[FieldShape {
    key: "message",
    kinds: &[FieldKind::String],
}];

/// Fields a mapping entry may carry
pub const ENTRY_OPTIONAL_FIELDS: &[FieldShape] = &[
    FieldShape {
        key: "code",
        kinds: &[FieldKind::String],
    },
    FieldShape {
        key: "data",
        kinds: &[FieldKind::DataFn, FieldKind::Object],
    },
    FieldShape {
        key: "logger",
        kinds: &[FieldKind::LoggerFn, FieldKind::Boolean],
    },
    FieldShape {
        key: "family",
        kinds: &[FieldKind::ErrorFamily],
    },
];

/// Field shape checker
pub struct Validator<'a> {
    families: &'a FamilyRegistry,
}

impl<'a> Validator<'a> {
    pub fn new(families: &'a FamilyRegistry) -> Self {
        Self { families }
    }

    /// Whether the value matches at least one of the kinds
    pub fn is_one_of(&self, value: &RawValue, kinds: &[FieldKind]) -> bool {
        kinds.iter().any(|kind| self.matches(value, *kind))
    }

    fn matches(&self, value: &RawValue, kind: FieldKind) -> bool {
        match (kind, value) {
            (FieldKind::String, RawValue::Json(Value::String(_))) => true,
            (FieldKind::Boolean, RawValue::Json(Value::Bool(_))) => true,
            (FieldKind::Object, RawValue::Json(Value::Object(_))) => true,
            (FieldKind::Array, RawValue::Json(Value::Array(_))) => true,
            (FieldKind::LoggerFn, RawValue::Logger(_)) => true,
            (FieldKind::DataFn, RawValue::Data(_)) => true,
            (FieldKind::ErrorFamily, RawValue::Class(name)) => {
                self.families.is_normalized_family(name)
            }
            (FieldKind::ErrorFamily, RawValue::Json(Value::String(name))) => {
                self.families.is_normalized_family(name)
            }
            _ => false,
        }
    }

    /// Every required field present and well-kinded, every present optional field well-kinded
    pub fn is_valid(
        &self,
        entry: &RawEntry,
        required: &[FieldShape],
        optional: &[FieldShape],
    ) -> bool {
        let required_ok = required.iter().all(|shape| match entry.get(shape.key) {
            Some(value) => self.is_one_of(value, shape.kinds),
            None => false,
        });

        let optional_ok = optional.iter().all(|shape| match entry.get(shape.key) {
            Some(value) => self.is_one_of(value, shape.kinds),
            None => true,
        });

        required_ok && optional_ok
    }

    /// Check an entry against the mapping entry shape
    pub fn is_valid_entry(&self, entry: &RawEntry) -> bool {
        self.is_valid(entry, ENTRY_REQUIRED_FIELDS, ENTRY_OPTIONAL_FIELDS)
    }

    /// Validate every entry in key order, failing at the first invalid one
    pub fn validate_table<'t>(
        &self,
        table: &'t RawTable,
        required: &[FieldShape],
        optional: &[FieldShape],
    ) -> ConverterResult<&'t RawTable> {
        for (key, entry) in table {
            if !self.is_valid(entry, required, optional) {
                return Err(ConverterError::invalid_entry(key.clone(), entry.describe()));
            }
        }
        Ok(table)
    }
}
