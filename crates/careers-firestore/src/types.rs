//! Firestore REST API types.
//!
//! Documents in this backend are free-form JSON objects, so the only
//! conversion needed is JSON <-> Firestore typed values. Integers keep their
//! integer type, everything Firestore-specific (timestamps, references,
//! geo points, bytes) reads back as the closest JSON shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number};
use std::collections::HashMap;

use crate::error::{FirestoreError, FirestoreResult};

/// Field path Firestore uses for the document name in queries.
pub const DOCUMENT_NAME_FIELD: &str = "__name__";

/// Firestore document value types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

impl Value {
    /// Shorthand for a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::StringValue(s.into())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::NullValue(()),
            serde_json::Value::Bool(b) => Value::BooleanValue(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::IntegerValue(i.to_string()),
                // u64 above i64::MAX and all floats
                None => Value::DoubleValue(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::StringValue(s),
            serde_json::Value::Array(items) => Value::ArrayValue(ArrayValue {
                values: Some(items.into_iter().map(Value::from).collect()),
            }),
            serde_json::Value::Object(map) => Value::MapValue(MapValue {
                fields: Some(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
            }),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::NullValue(()) => serde_json::Value::Null,
            Value::BooleanValue(b) => serde_json::Value::Bool(b),
            Value::IntegerValue(s) => s
                .parse::<i64>()
                .map(|i| serde_json::Value::Number(i.into()))
                .unwrap_or(serde_json::Value::String(s)),
            Value::DoubleValue(f) => Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::TimestampValue(s)
            | Value::StringValue(s)
            | Value::BytesValue(s)
            | Value::ReferenceValue(s) => serde_json::Value::String(s),
            Value::GeoPointValue(p) => {
                let mut map = Map::new();
                map.insert("latitude".to_string(), serde_json::json!(p.latitude));
                map.insert("longitude".to_string(), serde_json::json!(p.longitude));
                serde_json::Value::Object(map)
            }
            Value::ArrayValue(a) => serde_json::Value::Array(
                a.values
                    .unwrap_or_default()
                    .into_iter()
                    .map(serde_json::Value::from)
                    .collect(),
            ),
            Value::MapValue(m) => serde_json::Value::Object(fields_to_json(m.fields.unwrap_or_default())),
        }
    }
}

/// Convert a field map into a JSON object.
pub fn fields_to_json(fields: HashMap<String, Value>) -> Map<String, serde_json::Value> {
    fields
        .into_iter()
        .map(|(k, v)| (k, serde_json::Value::from(v)))
        .collect()
}

/// Convert a JSON object into a field map.
pub fn json_to_fields(object: Map<String, serde_json::Value>) -> HashMap<String, Value> {
    object.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

/// Firestore document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Document fields
    pub fields: Option<HashMap<String, Value>>,
    /// Create time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    /// Update time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    /// Create a new document with the given fields.
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self {
            fields: Some(fields),
            ..Default::default()
        }
    }

    /// Last path segment of the resource name.
    pub fn document_id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }

    /// Convert to a JSON object, exposing the document id under `id_key`.
    pub fn into_json_object(self, id_key: &str) -> FirestoreResult<Map<String, serde_json::Value>> {
        let id = self
            .document_id()
            .map(str::to_string)
            .ok_or_else(|| FirestoreError::invalid_document("document has no name"))?;

        let mut object = fields_to_json(self.fields.unwrap_or_default());
        object.insert(id_key.to_string(), serde_json::Value::String(id));
        Ok(object)
    }
}

/// Document field mask for reads and partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    pub field_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetDocumentsRequest {
    pub documents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<DocumentMask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetDocumentsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<String>,
}

// ============================================================================
// Structured queries
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<Order>>,
}

impl StructuredQuery {
    /// All documents of one collection, in document name order.
    pub fn collection(collection_id: impl Into<String>) -> Self {
        Self {
            from: vec![CollectionSelector {
                collection_id: collection_id.into(),
                all_descendants: None,
            }],
            r#where: None,
            order_by: Some(vec![Order {
                field: FieldReference {
                    field_path: DOCUMENT_NAME_FIELD.to_string(),
                },
                direction: "ASCENDING".to_string(),
            }]),
        }
    }

    /// Restrict to documents whose `field` equals `value`.
    pub fn where_equal(mut self, field: impl Into<String>, value: Value) -> Self {
        self.r#where = Some(Filter {
            field_filter: Some(FieldFilter {
                field: FieldReference {
                    field_path: field.into(),
                },
                op: "EQUAL".to_string(),
                value,
            }),
        });
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_descendants: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_filter: Option<FieldFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub field: FieldReference,
    pub direction: String,
}
