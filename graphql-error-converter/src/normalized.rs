//! Client-facing normalized errors

use crate::original::{Location, OriginalError, PathSegment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Extension metadata of a normalized error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorExtensions {
    pub code: String,
    pub data: Value,
}

/// The error returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedError {
    pub message: String,
    pub extensions: ErrorExtensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
}

impl NormalizedError {
    pub fn new(message: impl Into<String>, code: impl Into<String>, data: Value) -> Self {
        Self {
            message: message.into(),
            extensions: ErrorExtensions {
                code: code.into(),
                data,
            },
            path: None,
            locations: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.extensions.code
    }

    pub fn data(&self) -> &Value {
        &self.extensions.data
    }

    /// View this error as an already-normalized original error
    pub fn to_original(&self) -> OriginalError {
        let mut extensions = Map::new();
        extensions.insert("code".to_string(), Value::String(self.extensions.code.clone()));
        extensions.insert("data".to_string(), self.extensions.data.clone());

        OriginalError::new()
            .with_message(self.message.clone())
            .with_extensions(extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let mut error = NormalizedError::new("Out of stock", "OUT_OF_STOCK", json!({ "sku": "X1" }));
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({ "message": "Out of stock", "extensions": { "code": "OUT_OF_STOCK", "data": { "sku": "X1" } } })
        );

        error.path = Some(vec![PathSegment::Field("product".to_string())]);
        error.locations = Some(vec![Location { line: 1, column: 3 }]);
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["path"], json!(["product"]));
        assert_eq!(value["locations"], json!([{ "line": 1, "column": 3 }]));
    }

    #[test]
    fn test_to_original_is_normalized() {
        let original = NormalizedError::new("m", "C", json!({})).to_original();
        assert!(original.is_normalized());
        assert_eq!(original.extensions().unwrap()["code"], json!("C"));
    }
}
