//! Mapping tables keyed by error name, code, type or class name

use crate::entry::MappingEntry;
use crate::error::ConverterResult;
use crate::family::FamilyRegistry;
use crate::shape::{RawTable, Validator, ENTRY_OPTIONAL_FIELDS, ENTRY_REQUIRED_FIELDS};
use std::collections::BTreeMap;

/// Identifying key to conversion rule
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: BTreeMap<String, MappingEntry>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, entry: MappingEntry) -> Self {
        self.entries.insert(key.into(), entry);
        self
    }

    /// Merge typed partial tables; later tables win on key collisions
    pub fn merge<I>(partials: I) -> Self
    where
        I: IntoIterator<Item = MappingTable>,
    {
        let mut merged = MappingTable::new();
        for partial in partials {
            merged.entries.extend(partial.entries);
        }
        merged
    }

    /// Validate and merge raw partial tables in order
    ///
    /// Each partial table is validated before it is merged; the first
    /// invalid entry aborts the whole merge.
    pub fn from_raw_tables(partials: &[RawTable], families: &FamilyRegistry) -> ConverterResult<Self> {
        let validator = Validator::new(families);
        let mut merged = RawTable::new();

        for partial in partials {
            validator.validate_table(partial, ENTRY_REQUIRED_FIELDS, ENTRY_OPTIONAL_FIELDS)?;
            merged.extend(partial.iter().map(|(key, entry)| (key.clone(), entry.clone())));
        }

        let entries = merged
            .iter()
            .map(|(key, raw)| (key.clone(), MappingEntry::from_validated(raw, families)))
            .collect();

        Ok(Self { entries })
    }

    /// Validate a single raw table
    pub fn from_raw_table(table: &RawTable, families: &FamilyRegistry) -> ConverterResult<Self> {
        Self::from_raw_tables(std::slice::from_ref(table), families)
    }

    pub fn get(&self, key: &str) -> Option<&MappingEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
