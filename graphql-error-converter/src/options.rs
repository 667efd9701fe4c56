//! Converter options and the runtime configuration built from them

use crate::entry::{default_logger, EntryLogger, LogFn, MappingEntry};
use crate::error::{ConfigWarning, ConverterError, ConverterResult};
use crate::family::{FamilyRegistry, INTERNAL_SERVER_ERROR};
use crate::shape::{RawEntry, RawTable, RawValue, Validator};
use crate::table::MappingTable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_FALLBACK_MESSAGE: &str = "Internal Server Error";

/// What to do with errors that carry nothing to classify them by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapelessPolicy {
    /// Return them unmodified, like already-normalized errors
    #[default]
    PassThrough,
    /// Convert them with the fallback entry
    Convert,
}

/// One mapping table or an ordered list of partial tables
#[derive(Debug, Clone)]
pub enum RawTables {
    Single(RawTable),
    List(Vec<RawTable>),
}

/// Loosely-typed converter options
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    pub logger: Option<RawValue>,
    pub fallback: Option<RawValue>,
    pub mapping_table: Option<RawTables>,
    pub families: FamilyRegistry,
}

impl RawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: impl Into<RawValue>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<RawValue>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn with_mapping_table(mut self, table: RawTable) -> Self {
        self.mapping_table = Some(RawTables::Single(table));
        self
    }

    pub fn with_mapping_tables(mut self, tables: Vec<RawTable>) -> Self {
        self.mapping_table = Some(RawTables::List(tables));
        self
    }

    pub fn with_families(mut self, families: FamilyRegistry) -> Self {
        self.families = families;
        self
    }

    /// Read options from a JSON document
    ///
    /// Recognises `logger`, `fallback` and `mappingTable` (or `errorMap`).
    /// A string fallback names an error family.
    /// Table entries that are not JSON objects are rejected as invalid
    /// mapping entries.
    pub fn from_json(document: &Value) -> ConverterResult<Self> {
        let object = document
            .as_object()
            .ok_or_else(|| ConverterError::InvalidOptions(format!("expected an object, got {}", document)))?;

        let mut options = RawOptions::new();
        options.logger = object.get("logger").cloned().map(RawValue::Json);
        options.fallback = object.get("fallback").map(|fallback| match fallback {
            Value::String(class_name) => RawValue::Class(class_name.clone()),
            other => RawValue::Json(other.clone()),
        });

        let tables = object.get("mappingTable").or_else(|| object.get("errorMap"));
        options.mapping_table = match tables {
            None | Some(Value::Null) => None,
            Some(Value::Array(list)) => Some(RawTables::List(
                list.iter().map(raw_table_from_json).collect::<ConverterResult<_>>()?,
            )),
            Some(single) => Some(RawTables::Single(raw_table_from_json(single)?)),
        };

        Ok(options)
    }
}

/// Convert a JSON object of entries into a raw table
pub fn raw_table_from_json(value: &Value) -> ConverterResult<RawTable> {
    let object = value
        .as_object()
        .ok_or_else(|| ConverterError::InvalidOptions(format!("mapping table must be an object, got {}", value)))?;

    object
        .iter()
        .map(|(key, entry)| {
            RawEntry::from_json(entry)
                .map(|raw| (key.clone(), raw))
                .ok_or_else(|| ConverterError::invalid_entry(key.clone(), entry.to_string()))
        })
        .collect()
}

/// Immutable configuration a converter runs with
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub should_log: bool,
    pub logger: LogFn,
    pub fallback: MappingEntry,
    pub mapping_table: MappingTable,
    pub debug: bool,
    pub shapeless_policy: ShapelessPolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            should_log: true,
            logger: default_logger(),
            fallback: default_fallback(),
            mapping_table: MappingTable::new(),
            debug: false,
            shapeless_policy: ShapelessPolicy::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_shapeless_policy(mut self, policy: ShapelessPolicy) -> Self {
        self.shapeless_policy = policy;
        self
    }

    pub fn with_mapping_table(mut self, table: MappingTable) -> Self {
        self.mapping_table = table;
        self
    }

    pub fn with_fallback(mut self, fallback: MappingEntry) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_logger(mut self, logger: LogFn) -> Self {
        self.logger = logger;
        self
    }

    pub fn without_logging(mut self) -> Self {
        self.should_log = false;
        self
    }
}

/// Built-in fallback entry
pub fn default_fallback() -> MappingEntry {
    MappingEntry::new(DEFAULT_FALLBACK_MESSAGE)
        .with_code(INTERNAL_SERVER_ERROR)
        .with_logger(EntryLogger::Default)
}

/// Build a runtime configuration, discarding warnings after logging them
pub fn parse_config(raw: &RawOptions) -> ConverterResult<RuntimeConfig> {
    parse_config_with_warnings(raw).map(|(config, _)| config)
}

/// Build a runtime configuration and report which options were replaced by defaults
pub fn parse_config_with_warnings(raw: &RawOptions) -> ConverterResult<(RuntimeConfig, Vec<ConfigWarning>)> {
    let mut config = RuntimeConfig::default();
    let mut warnings = Vec::new();

    match &raw.logger {
        None | Some(RawValue::Json(Value::Bool(true))) => {}
        Some(RawValue::Json(Value::Bool(false))) => config.should_log = false,
        Some(RawValue::Logger(logger)) => config.logger = logger.clone(),
        Some(other) => {
            tracing::warn!(value = %other.describe(), "invalid logger option, using default logger");
            warnings.push(ConfigWarning::InvalidOption { option: "logger" });
        }
    }

    if let Some(fallback) = &raw.fallback {
        match parse_fallback(fallback, &raw.families) {
            Some(entry) => config.fallback = entry,
            None => {
                tracing::warn!(value = %fallback.describe(), "invalid fallback option, using default fallback");
                warnings.push(ConfigWarning::InvalidOption { option: "fallback" });
            }
        }
    }

    config.mapping_table = match &raw.mapping_table {
        None => MappingTable::new(),
        Some(RawTables::Single(table)) => MappingTable::from_raw_table(table, &raw.families)?,
        Some(RawTables::List(tables)) => MappingTable::from_raw_tables(tables, &raw.families)?,
    };

    tracing::debug!(
        entries = config.mapping_table.len(),
        should_log = config.should_log,
        "parsed error converter options"
    );

    Ok((config, warnings))
}

/// A fallback is either a full entry or the name of a normalized error family
fn parse_fallback(value: &RawValue, families: &FamilyRegistry) -> Option<MappingEntry> {
    let validator = Validator::new(families);

    let entry = match value {
        RawValue::Entry(entry) => Some(entry.clone()),
        RawValue::Json(json @ Value::Object(_)) => RawEntry::from_json(json),
        _ => None,
    };
    if let Some(entry) = entry {
        return validator
            .is_valid_entry(&entry)
            .then(|| MappingEntry::from_validated(&entry, families));
    }

    let class_name = match value {
        RawValue::Class(name) => name,
        _ => return None,
    };
    let family = families.lookup(class_name)?.clone();

    // the family decides the outgoing code
    Some(
        MappingEntry::new(DEFAULT_FALLBACK_MESSAGE)
            .with_family(family)
            .with_logger(EntryLogger::Default),
    )
}
