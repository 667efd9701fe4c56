//! Errors as they arrive from resolvers

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Identifying attributes a host error type can expose for lookup
pub trait IdentifiedError: std::error::Error {
    fn error_name(&self) -> Option<&str> {
        None
    }

    fn error_code(&self) -> Option<&str> {
        None
    }

    fn error_type(&self) -> Option<&str> {
        None
    }

    /// Additional fields made available to data functions
    fn error_fields(&self) -> Map<String, Value> {
        Map::new()
    }
}

/// An error raised during resolution, before normalization
#[derive(Clone, Default)]
pub struct OriginalError {
    name: Option<String>,
    code: Option<String>,
    error_type: Option<String>,
    class_name: Option<String>,
    message: Option<String>,
    fields: Map<String, Value>,
    extensions: Option<Map<String, Value>>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl OriginalError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder for failures that never reached a resolver
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Capture any error, using its type name as the class name
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            class_name: Some(short_type_name::<E>().to_string()),
            message: Some(error.to_string()),
            source: Some(Arc::new(error)),
            ..Self::default()
        }
    }

    /// Capture an error that exposes its own identifying attributes
    pub fn capture<E>(error: E) -> Self
    where
        E: IdentifiedError + Send + Sync + 'static,
    {
        Self {
            name: error.error_name().map(str::to_string),
            code: error.error_code().map(str::to_string),
            error_type: error.error_type().map(str::to_string),
            fields: error.error_fields(),
            ..Self::from_error(error)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Mark the error as already normalized by attaching extension metadata
    pub fn with_extensions(mut self, extensions: Map<String, Value>) -> Self {
        self.extensions = Some(extensions);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn error_type(&self) -> Option<&str> {
        self.error_type.as_deref()
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn extensions(&self) -> Option<&Map<String, Value>> {
        self.extensions.as_ref()
    }

    pub fn source_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Whether the error already carries normalized extension metadata
    pub fn is_normalized(&self) -> bool {
        self.extensions.is_some()
    }

    /// Whether the error carries nothing at all to classify it by
    pub fn is_shapeless(&self) -> bool {
        self.name.is_none()
            && self.code.is_none()
            && self.error_type.is_none()
            && self.class_name.is_none()
            && self.message.is_none()
            && self.fields.is_empty()
            && self.extensions.is_none()
    }
}

impl PartialEq for OriginalError {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.code == other.code
            && self.error_type == other.error_type
            && self.class_name == other.class_name
            && self.message == other.message
            && self.fields == other.fields
            && self.extensions == other.extensions
    }
}

impl fmt::Debug for OriginalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginalError")
            .field("name", &self.name)
            .field("code", &self.code)
            .field("type", &self.error_type)
            .field("class_name", &self.class_name)
            .field("message", &self.message)
            .field("fields", &self.fields)
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl fmt::Display for OriginalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self
            .name
            .as_deref()
            .or(self.class_name.as_deref())
            .unwrap_or("Error");
        match &self.message {
            Some(message) => write!(f, "{}: {}", label, message),
            None => f.write_str(label),
        }
    }
}

impl std::error::Error for OriginalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

/// Position of an error in the query document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// One step of a response path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// The host's wrapping error: the original error plus where it happened
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorEnvelope {
    pub original: OriginalError,
    pub path: Option<Vec<PathSegment>>,
    pub locations: Option<Vec<Location>>,
}

impl ErrorEnvelope {
    pub fn new(original: OriginalError) -> Self {
        Self {
            original,
            path: None,
            locations: None,
        }
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = Some(locations);
        self
    }
}

impl From<OriginalError> for ErrorEnvelope {
    fn from(original: OriginalError) -> Self {
        Self::new(original)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
