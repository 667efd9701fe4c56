//! Error conversion for GraphQL servers
//!
//! Errors raised while resolving a request are matched against a mapping
//! table and turned into client-safe errors with a stable message, code and
//! structured data. Unmatched errors use a fallback entry and are logged;
//! errors that are already normalized pass through untouched.

pub mod converter;
pub mod dispatcher;
pub mod entry;
pub mod error;
pub mod family;
pub mod graphql;
pub mod normalized;
pub mod options;
pub mod original;
pub mod resolver;
pub mod shape;
pub mod table;

// Re-export commonly used types
pub use dispatcher::{DispatchState, ErrorConverter, Formatted};
pub use entry::{bases, default_logger, extend_entry, DataFn, EntryData, EntryLogger, LogFn, MappingEntry};
pub use error::{ConfigWarning, ConverterError, ConverterResult};
pub use family::{ErrorFamily, FamilyRegistry};
pub use normalized::{ErrorExtensions, NormalizedError};
pub use options::{parse_config, parse_config_with_warnings, RawOptions, RawTables, RuntimeConfig, ShapelessPolicy};
pub use original::{ErrorEnvelope, IdentifiedError, Location, OriginalError, PathSegment};
pub use resolver::{resolve, MatchedBy};
pub use shape::{RawEntry, RawTable, RawValue, Validator};
pub use table::MappingTable;

#[cfg(feature = "graphql")]
pub use graphql::{format_server_error, ErrorConverterExtension};
