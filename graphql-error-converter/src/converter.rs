//! Builds normalized errors from mapping entries

use crate::entry::{empty_data, EntryLogger, LogFn, MappingEntry};
use crate::error::ConverterResult;
use crate::normalized::NormalizedError;
use crate::options::RuntimeConfig;
use crate::original::{Location, OriginalError, PathSegment};

/// Where in the response the error happened
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    pub path: Option<Vec<PathSegment>>,
    pub locations: Option<Vec<Location>>,
}

/// Convert an error that matched a table entry
///
/// Logs only when the entry asks for it: its own logger, or the configured
/// one for `logger: true`.
pub fn convert_mapped(
    config: &RuntimeConfig,
    error: &OriginalError,
    entry: &MappingEntry,
    context: ErrorContext,
) -> ConverterResult<NormalizedError> {
    let logger: Option<&LogFn> = match entry.logger() {
        Some(EntryLogger::Custom(logger)) => Some(logger),
        Some(EntryLogger::Default) => Some(&config.logger),
        Some(EntryLogger::Disabled) | None => None,
    };

    if let Some(logger) = logger {
        logger.call(error)?;
    }

    build(error, entry, context)
}

/// Convert an error with the fallback entry, logging whenever logging is enabled
pub fn convert_unmapped(
    config: &RuntimeConfig,
    error: &OriginalError,
    fallback: &MappingEntry,
    context: ErrorContext,
) -> ConverterResult<NormalizedError> {
    if config.should_log {
        config.logger.call(error)?;
    }

    build(error, fallback, context)
}

fn build(
    error: &OriginalError,
    entry: &MappingEntry,
    context: ErrorContext,
) -> ConverterResult<NormalizedError> {
    let data = match entry.data() {
        Some(data) => data.resolve(error)?,
        None => empty_data(),
    };

    let mut normalized = NormalizedError::new(entry.message(), entry.effective_code(), data);
    normalized.path = context.path;
    normalized.locations = context.locations;
    Ok(normalized)
}
