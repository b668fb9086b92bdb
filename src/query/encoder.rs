//! Result set to JSON encoding.
//!
//! Converts a [`QueryResult`] into the JSON value returned under `result`.
//! FindSet rows become objects keyed by column name in column order; Count and
//! IsEmpty read the single scalar their statements produce.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{Map, Number, Value as JsonValue};

use super::OperationKind;
use crate::db::{QueryResult, Row, Value};
use crate::error::{ProxyError, Result};

/// Encodes a result set for the given operation.
///
/// Only Count and IsEmpty can fail, when the backend does not return the
/// single integer their statements always produce.
pub fn encode_result(kind: OperationKind, result: &QueryResult) -> Result<JsonValue> {
    match kind {
        OperationKind::FindSet => Ok(encode_find_set(result)),
        OperationKind::Count => encode_count(result),
        OperationKind::IsEmpty => encode_is_empty(result),
    }
}

/// Encodes every row as a JSON object.
pub fn encode_find_set(result: &QueryResult) -> JsonValue {
    JsonValue::Array(
        result
            .rows
            .iter()
            .map(|row| encode_row(result, row))
            .collect(),
    )
}

/// Encodes the row count produced by `SELECT COUNT(*)`.
pub fn encode_count(result: &QueryResult) -> Result<JsonValue> {
    Ok(JsonValue::from(scalar_int(result, OperationKind::Count)?))
}

/// Encodes the flag produced by `IF EXISTS ... SELECT 0 ELSE SELECT 1`.
///
/// A flag of `0` encodes as `true`; any other value as `false`.
pub fn encode_is_empty(result: &QueryResult) -> Result<JsonValue> {
    Ok(JsonValue::Bool(scalar_int(result, OperationKind::IsEmpty)? == 0))
}

fn encode_row(result: &QueryResult, row: &Row) -> JsonValue {
    let mut object = Map::with_capacity(result.columns.len());
    for (column, value) in result.columns.iter().zip(row) {
        // Duplicate names keep the first position and the last value.
        object.insert(column.name.clone(), to_json(value));
    }
    JsonValue::Object(object)
}

fn scalar_int(result: &QueryResult, kind: OperationKind) -> Result<i64> {
    let value = result.first_value().ok_or_else(|| {
        ProxyError::unexpected_result(format!(
            "{kind} expected one row with one column, got {} rows",
            result.row_count()
        ))
    })?;

    match value {
        Value::Bool(b) => Ok(i64::from(*b)),
        other => other.as_i64().ok_or_else(|| {
            ProxyError::unexpected_result(format!(
                "{kind} expected an integer scalar, got {}",
                other.type_name()
            ))
        }),
    }
}

/// Converts a single value to its JSON representation.
pub fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Decimal(text) => text
            .parse::<Number>()
            .map_or_else(|_| JsonValue::String(text.clone()), JsonValue::Number),
        Value::String(s) | Value::Guid(s) => JsonValue::String(s.clone()),
        Value::Bytes(b) => JsonValue::String(STANDARD.encode(b)),
        Value::Date(d) => JsonValue::String(d.format("%Y-%m-%dT00:00:00").to_string()),
        Value::Time(t) => JsonValue::String(t.format("%H:%M:%S%.f").to_string()),
        Value::DateTime(dt) => JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        Value::DateTimeOffset(dt) => {
            JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string())
        }
    }
}
