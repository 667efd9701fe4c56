//! Integration tests for error conversion

use graphql_error_converter::{
    bases, extend_entry, DataFn, ErrorConverter, ErrorEnvelope, FamilyRegistry, Formatted, LogFn,
    NormalizedError, OriginalError, RawEntry, RawOptions, RawTable, RawValue,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[cfg(feature = "graphql")]
use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema, Value as GraphQLValue};
#[cfg(feature = "graphql")]
use graphql_error_converter::ErrorConverterExtension;

/// Logger counting its calls
fn counting_logger() -> (LogFn, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let logger = LogFn::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (logger, calls)
}

/// Options with a single OutOfStock entry whose data comes from the error
fn out_of_stock_options(logger: LogFn) -> RawOptions {
    let entry = RawEntry::new()
        .with_json("message", "Out of stock")
        .with_json("code", "OUT_OF_STOCK")
        .with("data", DataFn::new(|error| Ok(json!({ "sku": error.field("sku") }))));

    let mut table = RawTable::new();
    table.insert("OutOfStock".to_string(), entry);

    RawOptions::new().with_logger(logger).with_mapping_table(table)
}

#[test]
fn test_mapped_error_scenario() {
    let (logger, calls) = counting_logger();
    let converter = ErrorConverter::new(&out_of_stock_options(logger), false).unwrap();

    let error = OriginalError::new().with_name("OutOfStock").with_field("sku", "X1");
    let formatted = converter.format_error(ErrorEnvelope::new(error)).unwrap();

    let expected = NormalizedError::new("Out of stock", "OUT_OF_STOCK", json!({ "sku": "X1" }));
    assert_eq!(formatted, Formatted::Converted(expected));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unmapped_error_scenario() {
    let (logger, calls) = counting_logger();
    let converter = ErrorConverter::new(&out_of_stock_options(logger), false).unwrap();

    let formatted = converter
        .format_error(ErrorEnvelope::new(OriginalError::new().with_name("Unknown")))
        .unwrap();

    let normalized = formatted.converted().unwrap();
    assert_eq!(
        serde_json::to_value(normalized).unwrap(),
        json!({ "message": "Internal Server Error", "extensions": { "code": "INTERNAL_SERVER_ERROR", "data": {} } })
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_second_partial_table_wins() {
    let (logger, calls) = counting_logger();
    let first: RawTable = [(
        "Dup".to_string(),
        RawEntry::from_json(&json!({ "message": "first", "logger": true })).unwrap(),
    )]
    .into_iter()
    .collect();
    let second: RawTable = [(
        "Dup".to_string(),
        RawEntry::from_json(&json!({ "message": "dup", "logger": true })).unwrap(),
    )]
    .into_iter()
    .collect();

    let options = RawOptions::new()
        .with_logger(logger)
        .with_mapping_tables(vec![first, second]);
    let converter = ErrorConverter::new(&options, false).unwrap();

    let formatted = converter
        .format_error(ErrorEnvelope::new(OriginalError::new().with_code("Dup")))
        .unwrap();

    assert_eq!(formatted.converted().unwrap().message, "dup");
    // `logger: true` routes through the configured logger
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_invalid_table_aborts_construction() {
    let options = RawOptions::from_json(&json!({
        "mappingTable": [
            { "Fine": { "message": "fine" } },
            { "Broken": { "code": "NO_MESSAGE" } }
        ]
    }))
    .unwrap();

    let error = ErrorConverter::new(&options, false).unwrap_err();
    assert!(error.to_string().contains("[Broken]"));
}

#[test]
fn test_class_name_lookup_for_library_errors() {
    let mut table = RawTable::new();
    table.insert(
        "Error".to_string(),
        RawEntry::from_json(&json!({ "message": "Storage unavailable", "code": "STORAGE" })).unwrap(),
    );
    let options = RawOptions::new().with_logger(json!(false)).with_mapping_table(table);
    let converter = ErrorConverter::new(&options, false).unwrap();

    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "/var/data/db.sqlite locked");
    let formatted = converter
        .format_error(OriginalError::from_error(io_error).into())
        .unwrap();

    let normalized = formatted.converted().unwrap();
    assert_eq!(normalized.code(), "STORAGE");
    assert!(!normalized.message.contains("/var/data"));
}

#[test]
fn test_extended_base_entry_in_table() {
    let families = FamilyRegistry::default();
    let patch = RawEntry::new()
        .with("data", DataFn::new(|error| Ok(json!({ "fields": error.field("fields") }))))
        .with("family", RawValue::Class("UserInputError".to_string()));
    let invalid_fields = extend_entry(&bases::invalid_fields(), &patch, &families).unwrap();

    let mut table = RawTable::new();
    table.insert("ValidationError".to_string(), invalid_fields.to_raw());
    let options = RawOptions::new().with_logger(json!(false)).with_mapping_table(table);
    let converter = ErrorConverter::new(&options, false).unwrap();

    let error = OriginalError::new()
        .with_name("ValidationError")
        .with_field("fields", json!({ "email": "taken" }));
    let formatted = converter.format_error(error.into()).unwrap();

    let normalized = formatted.converted().unwrap();
    assert_eq!(normalized.message, "Invalid Field Values");
    assert_eq!(normalized.code(), "INVALID_FIELDS");
    assert_eq!(normalized.data(), &json!({ "fields": { "email": "taken" } }));
}

#[test]
fn test_converter_shared_across_threads() {
    let (logger, calls) = counting_logger();
    let converter = Arc::new(ErrorConverter::new(&out_of_stock_options(logger), false).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let converter = converter.clone();
            std::thread::spawn(move || {
                let error = OriginalError::new().with_name(format!("Unknown{}", i));
                converter.format_error(error.into()).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(!handle.join().unwrap().is_pass_through());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

/// Host error type exposing its own identifying attributes
#[cfg(feature = "graphql")]
#[derive(Debug)]
struct StockError {
    sku: String,
}

#[cfg(feature = "graphql")]
impl std::fmt::Display for StockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no stock left for {}", self.sku)
    }
}

#[cfg(feature = "graphql")]
impl std::error::Error for StockError {}

#[cfg(feature = "graphql")]
impl graphql_error_converter::IdentifiedError for StockError {
    fn error_name(&self) -> Option<&str> {
        Some("OutOfStock")
    }

    fn error_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut fields = serde_json::Map::new();
        fields.insert("sku".to_string(), json!(self.sku));
        fields
    }
}

#[cfg(feature = "graphql")]
fn reserve(sku: &str) -> Result<String, StockError> {
    Err(StockError { sku: sku.to_string() })
}

#[cfg(feature = "graphql")]
struct Query;

#[cfg(feature = "graphql")]
#[Object]
impl Query {
    async fn product(&self) -> async_graphql::Result<String> {
        Err(OriginalError::new()
            .with_name("OutOfStock")
            .with_field("sku", "X1")
            .into_graphql_error())
    }

    async fn order(&self) -> async_graphql::Result<String> {
        Err(OriginalError::new().with_name("Unknown").into_graphql_error())
    }

    async fn stock(&self) -> async_graphql::Result<String> {
        reserve("X2").map_err(|e| OriginalError::capture(e).into_graphql_error())
    }

    async fn database(&self) -> async_graphql::Result<String> {
        Err(OriginalError::new()
            .with_name("DbError")
            .with_message("password=hunter2 at db.internal:5432")
            .into_graphql_error())
    }

    async fn handled(&self) -> async_graphql::Result<String> {
        use async_graphql::ErrorExtensions;
        Err(async_graphql::Error::new("Not allowed").extend_with(|_, e| e.set("code", "FORBIDDEN")))
    }
}

#[cfg(feature = "graphql")]
#[tokio::test]
async fn test_schema_extension_converts_resolver_errors() {
    let (logger, calls) = counting_logger();
    let converter = ErrorConverter::new(&out_of_stock_options(logger), false).unwrap();
    let schema = Schema::build(Query, EmptyMutation, EmptySubscription)
        .extension(ErrorConverterExtension::new(converter))
        .finish();

    let response = schema.execute("{ product }").await;
    assert_eq!(response.errors.len(), 1);
    let error = &response.errors[0];
    let extensions = error.extensions.as_ref().unwrap();

    assert_eq!(error.message, "Out of stock");
    assert_eq!(extensions.get("code"), Some(&GraphQLValue::String("OUT_OF_STOCK".to_string())));
    assert_eq!(
        extensions.get("data"),
        Some(&GraphQLValue::from_json(json!({ "sku": "X1" })).unwrap())
    );
    assert_eq!(error.path, vec![async_graphql::PathSegment::Field("product".to_string())]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let response = schema.execute("{ order }").await;
    assert_eq!(response.errors[0].message, "Internal Server Error");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[cfg(feature = "graphql")]
#[tokio::test]
async fn test_schema_extension_keeps_handled_errors() {
    let (logger, calls) = counting_logger();
    let converter = ErrorConverter::new(&out_of_stock_options(logger), false).unwrap();
    let schema = Schema::build(Query, EmptyMutation, EmptySubscription)
        .extension(ErrorConverterExtension::new(converter))
        .finish();

    let response = schema.execute("{ handled }").await;
    let error = &response.errors[0];

    assert_eq!(error.message, "Not allowed");
    assert_eq!(
        error.extensions.as_ref().unwrap().get("code"),
        Some(&GraphQLValue::String("FORBIDDEN".to_string()))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[cfg(feature = "graphql")]
#[tokio::test]
async fn test_debug_mode_leaves_resolver_errors_alone() {
    let (logger, calls) = counting_logger();
    let converter = ErrorConverter::new(&out_of_stock_options(logger), true).unwrap();
    let schema = Schema::build(Query, EmptyMutation, EmptySubscription)
        .extension(ErrorConverterExtension::new(converter))
        .finish();

    let response = schema.execute("{ product }").await;
    let error = &response.errors[0];

    assert_eq!(error.message, "OutOfStock");
    assert!(error.extensions.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[cfg(feature = "graphql")]
#[tokio::test]
async fn test_failing_logger_yields_fallback_error() {
    let failing = LogFn::new(|_| Err(anyhow::anyhow!("sink offline")));
    let converter = ErrorConverter::new(&RawOptions::new().with_logger(failing), false).unwrap();
    let schema = Schema::build(Query, EmptyMutation, EmptySubscription)
        .extension(ErrorConverterExtension::new(converter))
        .finish();

    let response = schema.execute("{ database }").await;
    assert_eq!(response.errors.len(), 1);
    let error = &response.errors[0];
    let extensions = error.extensions.as_ref().unwrap();

    assert_eq!(error.message, "Internal Server Error");
    assert!(!error.message.contains("hunter2"));
    assert_eq!(
        extensions.get("code"),
        Some(&GraphQLValue::String("INTERNAL_SERVER_ERROR".to_string()))
    );
    assert_eq!(extensions.get("data"), Some(&GraphQLValue::from_json(json!({})).unwrap()));
    assert_eq!(error.path, vec![async_graphql::PathSegment::Field("database".to_string())]);
}

#[cfg(feature = "graphql")]
#[tokio::test]
async fn test_captured_host_error_is_looked_up_by_name() {
    let (logger, _) = counting_logger();
    let converter = ErrorConverter::new(&out_of_stock_options(logger), false).unwrap();
    let schema = Schema::build(Query, EmptyMutation, EmptySubscription)
        .extension(ErrorConverterExtension::new(converter))
        .finish();

    let response = schema.execute("{ stock }").await;
    let error = &response.errors[0];

    assert_eq!(error.message, "Out of stock");
    assert_eq!(
        error.extensions.as_ref().unwrap().get("data"),
        Some(&GraphQLValue::from_json(json!({ "sku": "X2" })).unwrap())
    );
}
