//! async-graphql integration
//!
//! Resolvers return [`OriginalError`] through
//! [`OriginalError::into_graphql_error`]; [`ErrorConverterExtension`] then
//! formats every error of each executed response.
//!
//! Host error types must be captured before they leave a resolver, e.g.
//! `OriginalError::capture(e).into_graphql_error()` for types implementing
//! [`IdentifiedError`](crate::original::IdentifiedError). An error raised with
//! `?` only keeps its message, so name, code, type and class name lookups
//! never match it.

#[cfg(feature = "graphql")]
use async_graphql::{
    extensions::{Extension, ExtensionContext, ExtensionFactory, NextExecute},
    ErrorExtensionValues, Pos, Response, ServerError, Value as GraphQLValue,
};
#[cfg(feature = "graphql")]
use std::sync::Arc;

#[cfg(feature = "graphql")]
use crate::dispatcher::{ErrorConverter, Formatted};
#[cfg(feature = "graphql")]
use crate::error::ConverterResult;
#[cfg(feature = "graphql")]
use crate::normalized::NormalizedError;
#[cfg(feature = "graphql")]
use crate::original::{ErrorEnvelope, Location, OriginalError, PathSegment};

#[cfg(feature = "graphql")]
impl OriginalError {
    /// Wrap as a resolver error, keeping this value as its source
    pub fn into_graphql_error(self) -> async_graphql::Error {
        async_graphql::Error::new_with_source(self)
    }
}

#[cfg(feature = "graphql")]
impl From<&async_graphql::PathSegment> for PathSegment {
    fn from(segment: &async_graphql::PathSegment) -> Self {
        match segment {
            async_graphql::PathSegment::Field(name) => PathSegment::Field(name.clone()),
            async_graphql::PathSegment::Index(index) => PathSegment::Index(*index),
        }
    }
}

#[cfg(feature = "graphql")]
impl From<PathSegment> for async_graphql::PathSegment {
    fn from(segment: PathSegment) -> Self {
        match segment {
            PathSegment::Field(name) => async_graphql::PathSegment::Field(name),
            PathSegment::Index(index) => async_graphql::PathSegment::Index(index),
        }
    }
}

#[cfg(feature = "graphql")]
impl From<Pos> for Location {
    fn from(pos: Pos) -> Self {
        Location {
            line: pos.line,
            column: pos.column,
        }
    }
}

#[cfg(feature = "graphql")]
impl From<Location> for Pos {
    fn from(location: Location) -> Self {
        Pos {
            line: location.line,
            column: location.column,
        }
    }
}

#[cfg(feature = "graphql")]
impl ErrorEnvelope {
    /// Read the original error back out of a server error
    ///
    /// Errors with extensions were already formatted by a resolver. Errors
    /// without a source or a response path never reached a resolver and
    /// become the shapeless placeholder.
    pub fn from_server_error(error: &ServerError) -> Self {
        let original = if let Some(extensions) = &error.extensions {
            let extensions = match serde_json::to_value(extensions) {
                Ok(serde_json::Value::Object(map)) => map,
                _ => serde_json::Map::new(),
            };
            OriginalError::new()
                .with_message(error.message.clone())
                .with_extensions(extensions)
        } else if let Some(original) = error.source::<OriginalError>() {
            original.clone()
        } else if error.source.is_some() || !error.path.is_empty() {
            OriginalError::new().with_message(error.message.clone())
        } else {
            OriginalError::placeholder()
        };

        let path = (!error.path.is_empty()).then(|| error.path.iter().map(PathSegment::from).collect());
        let locations =
            (!error.locations.is_empty()).then(|| error.locations.iter().copied().map(Location::from).collect());

        Self {
            original,
            path,
            locations,
        }
    }
}

#[cfg(feature = "graphql")]
impl From<NormalizedError> for ServerError {
    fn from(normalized: NormalizedError) -> Self {
        let mut extensions = ErrorExtensionValues::default();
        extensions.set("code", normalized.extensions.code);
        extensions.set(
            "data",
            GraphQLValue::from_json(normalized.extensions.data).unwrap_or(GraphQLValue::Null),
        );

        let mut error = ServerError::new(normalized.message, None);
        error.path = normalized
            .path
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();
        error.locations = normalized
            .locations
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();
        error.extensions = Some(extensions);
        error
    }
}

/// Format one server error, returning it untouched when it passes through
#[cfg(feature = "graphql")]
pub fn format_server_error(converter: &ErrorConverter, error: ServerError) -> ConverterResult<ServerError> {
    let envelope = ErrorEnvelope::from_server_error(&error);
    match converter.format_error(envelope)? {
        Formatted::PassThrough(_) => Ok(error),
        Formatted::Converted(normalized) => Ok(normalized.into()),
    }
}

/// Schema extension running the converter over every response error
#[cfg(feature = "graphql")]
#[derive(Clone)]
pub struct ErrorConverterExtension {
    converter: Arc<ErrorConverter>,
}

#[cfg(feature = "graphql")]
impl ErrorConverterExtension {
    pub fn new(converter: ErrorConverter) -> Self {
        Self {
            converter: Arc::new(converter),
        }
    }

    pub fn shared(converter: Arc<ErrorConverter>) -> Self {
        Self { converter }
    }
}

#[cfg(feature = "graphql")]
impl ExtensionFactory for ErrorConverterExtension {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(ErrorConverterExtensionImpl {
            converter: self.converter.clone(),
        })
    }
}

#[cfg(feature = "graphql")]
struct ErrorConverterExtensionImpl {
    converter: Arc<ErrorConverter>,
}

#[cfg(feature = "graphql")]
impl ErrorConverterExtensionImpl {
    fn format(&self, error: ServerError) -> ServerError {
        let envelope = ErrorEnvelope::from_server_error(&error);
        match self.converter.format_error(envelope) {
            Ok(Formatted::PassThrough(_)) => error,
            Ok(Formatted::Converted(normalized)) => normalized.into(),
            Err(e) => {
                // the raw error may carry internal details
                tracing::error!(error = %e, "failed to convert GraphQL error, using fallback");
                let mut fallback: ServerError = self.converter.fallback_error().into();
                fallback.path = error.path;
                fallback.locations = error.locations;
                fallback
            }
        }
    }
}

#[cfg(feature = "graphql")]
#[async_trait::async_trait]
impl Extension for ErrorConverterExtensionImpl {
    async fn execute(
        &self,
        ctx: &ExtensionContext<'_>,
        operation_name: Option<&str>,
        next: NextExecute<'_>,
    ) -> Response {
        let mut response = next.run(ctx, operation_name).await;
        if !response.errors.is_empty() {
            let errors = std::mem::take(&mut response.errors);
            response.errors = errors.into_iter().map(|error| self.format(error)).collect();
        }
        response
    }
}

#[cfg(test)]
#[cfg(feature = "graphql")]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_from_resolver_error() {
        let original = OriginalError::new().with_name("OutOfStock").with_field("sku", "X1");
        let mut error = original.clone().into_graphql_error().into_server_error(Pos { line: 1, column: 3 });
        error.path = vec![async_graphql::PathSegment::Field("product".to_string())];

        let envelope = ErrorEnvelope::from_server_error(&error);

        assert_eq!(envelope.original, original);
        assert_eq!(envelope.path, Some(vec![PathSegment::Field("product".to_string())]));
        assert_eq!(envelope.locations, Some(vec![Location { line: 1, column: 3 }]));
    }

    #[test]
    fn test_envelope_from_bare_error_is_shapeless() {
        let error = ServerError::new("Unknown field \"nope\"", Some(Pos { line: 1, column: 3 }));
        let envelope = ErrorEnvelope::from_server_error(&error);
        assert!(envelope.original.is_shapeless());
    }

    #[test]
    fn test_normalized_error_into_server_error() {
        let mut normalized = NormalizedError::new("Out of stock", "OUT_OF_STOCK", json!({ "sku": "X1" }));
        normalized.path = Some(vec![PathSegment::Field("product".to_string())]);

        let error: ServerError = normalized.into();
        let extensions = error.extensions.as_ref().unwrap();

        assert_eq!(error.message, "Out of stock");
        assert_eq!(extensions.get("code"), Some(&GraphQLValue::String("OUT_OF_STOCK".to_string())));
        assert_eq!(
            extensions.get("data"),
            Some(&GraphQLValue::from_json(json!({ "sku": "X1" })).unwrap())
        );
        assert_eq!(error.path, vec![async_graphql::PathSegment::Field("product".to_string())]);

        // converted errors are recognised as normalized on the next pass
        assert!(ErrorEnvelope::from_server_error(&error).original.is_normalized());
    }

    #[test]
    fn test_format_server_error_passes_normalized_through() {
        let converter = ErrorConverter::default();
        let error: ServerError = NormalizedError::new("m", "C", json!({})).into();

        let formatted = format_server_error(&converter, error.clone()).unwrap();
        assert_eq!(formatted, error);
    }
}
