//! SQLite row decoding.
//!
//! SQLite is dynamically typed: the storage class of each value decides how
//! it is read, and the declared column type only refines the result
//! (`BOOLEAN` integers become booleans, `DATETIME` text becomes a timestamp
//! when it parses).

use crate::models::{Record, Value};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Text layouts SQLite's date functions and common drivers produce.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Decodes every column of a row, keeping column order.
pub(crate) fn decode_row(row: &SqliteRow) -> Record {
    let columns = row.columns();
    let mut record = Record::with_capacity(columns.len());

    for column in columns {
        let declared = column.type_info().name().to_uppercase();
        let value = decode_column(row, column.ordinal(), &declared);
        record.push(column.name(), value);
    }

    record
}

fn decode_column(row: &SqliteRow, index: usize, declared: &str) -> Value {
    let raw = match row.try_get_raw(index) {
        Ok(raw) => raw,
        Err(_) => return unsupported(declared),
    };
    if raw.is_null() {
        return Value::Null;
    }
    let storage = raw.type_info().name().to_string();

    match storage.as_str() {
        "INTEGER" | "BOOLEAN" => match row.try_get_unchecked::<i64, _>(index) {
            Ok(n) if is_boolean_type(declared) => Value::Bool(n != 0),
            Ok(n) => Value::Integer(n),
            Err(_) => unsupported(declared),
        },
        "REAL" => row
            .try_get_unchecked::<f64, _>(index)
            .map(Value::Float)
            .unwrap_or_else(|_| unsupported(declared)),
        "TEXT" | "DATETIME" | "DATE" | "TIME" => {
            match row.try_get_unchecked::<String, _>(index) {
                Ok(text) if is_datetime_type(declared) => parse_timestamp(&text)
                    .map(Value::Timestamp)
                    .unwrap_or(Value::Text(text)),
                Ok(text) => Value::Text(text),
                Err(_) => unsupported(declared),
            }
        }
        "BLOB" => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(Value::Binary)
            .unwrap_or_else(|_| unsupported(declared)),
        _ => decode_untyped(row, index).unwrap_or_else(|| unsupported(&storage)),
    }
}

/// Tries the common representations in order of likelihood.
fn decode_untyped(row: &SqliteRow, index: usize) -> Option<Value> {
    if let Ok(text) = row.try_get::<String, _>(index) {
        return Some(Value::Text(text));
    }
    if let Ok(n) = row.try_get::<i64, _>(index) {
        return Some(Value::Integer(n));
    }
    if let Ok(x) = row.try_get::<f64, _>(index) {
        return Some(Value::Float(x));
    }
    row.try_get::<Vec<u8>, _>(index).ok().map(Value::Binary)
}

fn unsupported(type_name: &str) -> Value {
    Value::Unsupported {
        type_name: type_name.to_string(),
    }
}

fn is_boolean_type(declared: &str) -> bool {
    matches!(declared, "BOOLEAN" | "BOOL")
}

fn is_datetime_type(declared: &str) -> bool {
    matches!(declared, "DATETIME" | "TIMESTAMP")
}

/// Parses SQLite datetime text, treating zone-less values as UTC.
pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}
