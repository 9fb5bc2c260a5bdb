//! JSON to Firestore `Value` codec.
//!
//! The Firestore REST API wraps every field in a typed envelope
//! (`{"stringValue": ...}`, `{"integerValue": "42"}`, ...). This module
//! converts between plain `serde_json::Value` documents and that wire shape.
//!
//! Integers travel as decimal strings per the protobuf JSON mapping, and are
//! decoded back to JSON numbers. `timestampValue` decodes to its RFC 3339
//! string; document lifecycle timestamps come from `createTime`/`updateTime`
//! metadata, not from fields, so we never need to encode timestamps.

use serde_json::{Map, Value, json};

use crate::db::StoreError;

/// Encode a plain JSON value as a Firestore `Value`.
#[must_use]
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({"nullValue": null}),
        Value::Bool(b) => json!({"booleanValue": b}),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({"integerValue": i.to_string()})
            } else {
                json!({"doubleValue": n.as_f64()})
            }
        }
        Value::String(s) => json!({"stringValue": s}),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({"arrayValue": {"values": values}})
        }
        Value::Object(map) => {
            json!({"mapValue": {"fields": encode_fields(map)}})
        }
    }
}

/// Encode a JSON object as a Firestore `fields` map.
#[must_use]
pub fn encode_fields(map: &Map<String, Value>) -> Value {
    let fields: Map<String, Value> = map
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    Value::Object(fields)
}

/// Decode a Firestore `Value` back into plain JSON.
///
/// # Errors
///
/// Returns `StoreError::DataCorruption` on unknown envelopes or malformed
/// integer strings.
pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoreError::DataCorruption("expected value envelope".to_owned()))?;

    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| StoreError::DataCorruption("empty value envelope".to_owned()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(inner.clone()),
        "integerValue" => {
            let s = inner
                .as_str()
                .map(str::to_owned)
                .or_else(|| inner.as_i64().map(|i| i.to_string()))
                .ok_or_else(|| {
                    StoreError::DataCorruption("integerValue must be a string".to_owned())
                })?;
            let n: i64 = s
                .parse()
                .map_err(|e| StoreError::DataCorruption(format!("bad integerValue {s:?}: {e}")))?;
            Ok(json!(n))
        }
        "doubleValue" => Ok(inner.clone()),
        // Timestamps and references decode to their string form
        "stringValue" | "timestampValue" | "referenceValue" => Ok(inner.clone()),
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(items))
        }
        "mapValue" => {
            let fields = inner.get("fields").and_then(Value::as_object);
            match fields {
                Some(map) => decode_fields(map),
                None => Ok(json!({})),
            }
        }
        other => Err(StoreError::DataCorruption(format!(
            "unsupported Firestore value type: {other}"
        ))),
    }
}

/// Decode a Firestore `fields` map into a JSON object.
///
/// # Errors
///
/// Returns `StoreError::DataCorruption` when any field fails to decode.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Value, StoreError> {
    let mut out = Map::with_capacity(fields.len());
    for (key, value) in fields {
        out.insert(key.clone(), decode_value(value)?);
    }
    Ok(Value::Object(out))
}
