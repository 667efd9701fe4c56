//! Finds the mapping entry for an error

use crate::entry::MappingEntry;
use crate::original::OriginalError;
use crate::table::MappingTable;

/// Attribute that produced a lookup hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    Name,
    Code,
    Type,
    ClassName,
}

/// Look the error up by name, then code, then type, then class name
pub fn resolve<'t>(error: &OriginalError, table: &'t MappingTable) -> Option<&'t MappingEntry> {
    resolve_with_key(error, table).map(|(_, entry)| entry)
}

/// Like [`resolve`], also reporting which attribute matched
pub fn resolve_with_key<'t>(
    error: &OriginalError,
    table: &'t MappingTable,
) -> Option<(MatchedBy, &'t MappingEntry)> {
    let candidates = [
        (MatchedBy::Name, error.name()),
        (MatchedBy::Code, error.code()),
        (MatchedBy::Type, error.error_type()),
        (MatchedBy::ClassName, error.class_name()),
    ];

    candidates.into_iter().find_map(|(matched_by, key)| {
        key.and_then(|key| table.get(key)).map(|entry| (matched_by, entry))
    })
}
