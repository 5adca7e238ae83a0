//! PostgreSQL row decoding.
//!
//! Values are decoded by the column's reported type. Types with no natural
//! JSON form (`NUMERIC`, `DATE`, `TIME`, `UUID`) keep their text rendering;
//! enums decode to their label. Anything else is reported as unsupported
//! instead of failing the sample.

use crate::models::{Record, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::postgres::{PgColumn, PgRow, PgTypeKind};
use sqlx::types::BigDecimal;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Decodes every column of a row, keeping column order.
pub(crate) fn decode_row(row: &PgRow) -> Record {
    let columns = row.columns();
    let mut record = Record::with_capacity(columns.len());

    for column in columns {
        let value = decode_column(row, column);
        record.push(column.name(), value);
    }

    record
}

fn decode_column(row: &PgRow, column: &PgColumn) -> Value {
    let index = column.ordinal();
    let type_info = column.type_info();
    let type_name = type_info.name().to_string();

    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(_) => {}
        Err(_) => return unsupported(&type_name),
    }

    let decoded = match type_name.as_str() {
        "BOOL" => row.try_get::<bool, _>(index).ok().map(Value::Bool),
        "INT2" => row
            .try_get::<i16, _>(index)
            .ok()
            .map(|n| Value::Integer(n.into())),
        "INT4" => row
            .try_get::<i32, _>(index)
            .ok()
            .map(|n| Value::Integer(n.into())),
        "INT8" => row.try_get::<i64, _>(index).ok().map(Value::Integer),
        "FLOAT4" => row
            .try_get::<f32, _>(index)
            .ok()
            .map(|x| Value::Float(x.into())),
        "FLOAT8" => row.try_get::<f64, _>(index).ok().map(Value::Float),
        "NUMERIC" => row
            .try_get::<BigDecimal, _>(index)
            .ok()
            .map(|d| Value::Text(d.to_string())),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<String, _>(index).ok().map(Value::Text)
        }
        "TIMESTAMPTZ" => row
            .try_get::<DateTime<Utc>, _>(index)
            .ok()
            .map(Value::Timestamp),
        // Sessions run with timezone = 'UTC'
        "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(index)
            .ok()
            .map(|ts| Value::Timestamp(ts.and_utc())),
        "DATE" => row
            .try_get::<NaiveDate, _>(index)
            .ok()
            .map(|d| Value::Text(d.to_string())),
        "TIME" => row
            .try_get::<NaiveTime, _>(index)
            .ok()
            .map(|t| Value::Text(t.to_string())),
        "UUID" => row
            .try_get::<sqlx::types::Uuid, _>(index)
            .ok()
            .map(|u| Value::Text(u.to_string())),
        "JSON" | "JSONB" => row
            .try_get::<serde_json::Value, _>(index)
            .ok()
            .map(Value::Json),
        "BYTEA" => row.try_get::<Vec<u8>, _>(index).ok().map(Value::Binary),
        _ if matches!(type_info.kind(), PgTypeKind::Enum(_)) => row
            .try_get_unchecked::<String, _>(index)
            .ok()
            .map(Value::Text),
        _ => None,
    };

    decoded.unwrap_or_else(|| unsupported(&type_name))
}

fn unsupported(type_name: &str) -> Value {
    Value::Unsupported {
        type_name: type_name.to_string(),
    }
}
