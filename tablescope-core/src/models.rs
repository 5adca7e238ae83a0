//! Scan result data structures.
//!
//! Table contents are unknown until query time, so a [`Record`] is an ordered
//! list of column name and [`Value`] pairs rather than a typed struct. A
//! [`ScanResult`] keeps one [`TableReport`] per discovered table in discovery
//! order.

use crate::error::{Result, TableScopeError};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Longest identifier PostgreSQL keeps without truncation (NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_BYTES: usize = 63;

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    /// PostgreSQL (postgres:// or postgresql://)
    PostgreSQL,
    /// SQLite (sqlite: URLs or database file paths)
    SQLite,
}

impl DatabaseType {
    /// Schema scanned when none is configured.
    pub const fn default_schema(self) -> &'static str {
        match self {
            Self::PostgreSQL => "public",
            Self::SQLite => "main",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::SQLite => write!(f, "SQLite"),
        }
    }
}

/// A table identifier, kept exactly as the catalog spells it.
///
/// Names are case- and quoting-sensitive. They are never interpolated raw:
/// [`TableName::quoted`] produces the double-quoted (and, when a schema is
/// attached, schema-qualified) form used in every statement the adapters
/// build. Reports are keyed by the bare name unless it is shared across
/// schemas (see [`ScanResult`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName {
    schema: Option<String>,
    name: String,
}

impl TableName {
    /// Wraps a name read from the database catalog.
    pub(crate) fn from_catalog(schema: Option<String>, name: String) -> Self {
        Self { schema, name }
    }

    /// Validates an externally supplied table name.
    ///
    /// # Errors
    /// Returns [`TableScopeError::Identifier`] if the name is empty, contains
    /// a NUL byte, or is longer than [`MAX_IDENTIFIER_BYTES`].
    pub fn parse(name: &str) -> Result<Self> {
        validate_identifier("table", name)?;
        Ok(Self {
            schema: None,
            name: name.to_string(),
        })
    }

    /// Qualifies the name with a schema, validated like the table name.
    ///
    /// # Errors
    /// Returns [`TableScopeError::Identifier`] if the schema name is empty,
    /// contains a NUL byte, or is longer than [`MAX_IDENTIFIER_BYTES`].
    pub fn in_schema(mut self, schema: &str) -> Result<Self> {
        validate_identifier("schema", schema)?;
        self.schema = Some(schema.to_string());
        Ok(self)
    }

    /// Returns the bare table name.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Schema qualifier, if any.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Returns `schema.name` when a schema is attached, otherwise the bare name.
    /// Unquoted; meant for display, never for SQL.
    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Returns the name as a quoted SQL identifier, schema-qualified when known.
    pub fn quoted(&self) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}.{}",
                quote_identifier(schema),
                quote_identifier(&self.name)
            ),
            None => quote_identifier(&self.name),
        }
    }
}

fn validate_identifier(kind: &str, identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(TableScopeError::identifier(format!(
            "{kind} name cannot be empty"
        )));
    }
    if identifier.contains('\0') {
        return Err(TableScopeError::identifier(format!(
            "{kind} name cannot contain NUL bytes"
        )));
    }
    if identifier.len() > MAX_IDENTIFIER_BYTES {
        return Err(TableScopeError::identifier(format!(
            "{kind} name exceeds {MAX_IDENTIFIER_BYTES} bytes"
        )));
    }
    Ok(())
}

impl Serialize for TableName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// Quotes an identifier with double quotes, doubling embedded quotes.
///
/// Both PostgreSQL and SQLite accept this form.
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// A single column value decoded from a sampled row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// Any integer column that fits in 64 bits
    Integer(i64),
    /// Floating point
    Float(f64),
    /// Text, and any type rendered through its text form
    Text(String),
    /// Timestamp, normalized to UTC
    Timestamp(DateTime<Utc>),
    /// Raw bytes
    Binary(Vec<u8>),
    /// JSON document
    Json(serde_json::Value),
    /// Engine type the adapter cannot decode
    Unsupported {
        /// Engine type name
        type_name: String,
    },
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            Value::Binary(bytes) => serializer.serialize_str(&format!(
                "base64:{}",
                base64::engine::general_purpose::STANDARD.encode(bytes)
            )),
            Value::Json(json) => json.serialize(serializer),
            Value::Unsupported { type_name } => {
                serializer.serialize_str(&format!("<unsupported: {type_name}>"))
            }
        }
    }
}

/// One sampled row: column names and values in the order the engine returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    /// Appends a column.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.columns.push((column.into(), value));
    }

    /// Looks up a column by name. Returns the first match for duplicate names.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Terminal status of one table in a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// Count (and sample, if any rows) succeeded
    Ok,
    /// Count or sample failed
    Failed,
}

/// Row count and sample gathered for a table that could be read.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    /// Exact row count from `COUNT(*)`
    pub row_count: u64,
    /// Up to the sample limit records, in engine order
    pub sample: Vec<Record>,
}

/// What happened to one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    /// Table was counted and sampled
    Ok {
        /// Exact row count
        row_count: u64,
        /// Sampled records; empty when the table is empty
        sample: Vec<Record>,
    },
    /// Table could not be read
    Failed {
        /// Stringified cause
        error: String,
    },
}

/// Report for a single table. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableReport {
    name: TableName,
    #[serde(flatten)]
    outcome: TableOutcome,
}

impl TableReport {
    /// Builds a report for a successfully read table.
    pub fn ok(name: TableName, snapshot: TableSnapshot) -> Self {
        Self {
            name,
            outcome: TableOutcome::Ok {
                row_count: snapshot.row_count,
                sample: snapshot.sample,
            },
        }
    }

    /// Builds a report for a table that could not be read.
    pub fn failed(name: TableName, error: impl Into<String>) -> Self {
        Self {
            name,
            outcome: TableOutcome::Failed {
                error: error.into(),
            },
        }
    }

    /// Converts the result of reading one table into its report.
    pub fn from_result(name: TableName, result: Result<TableSnapshot>) -> Self {
        match result {
            Ok(snapshot) => Self::ok(name, snapshot),
            Err(e) => Self::failed(name, e.to_string()),
        }
    }

    /// Table this report describes.
    pub fn name(&self) -> &TableName {
        &self.name
    }

    /// Full outcome.
    pub fn outcome(&self) -> &TableOutcome {
        &self.outcome
    }

    /// Terminal status.
    pub fn status(&self) -> TableStatus {
        match self.outcome {
            TableOutcome::Ok { .. } => TableStatus::Ok,
            TableOutcome::Failed { .. } => TableStatus::Failed,
        }
    }

    /// Row count, present iff the table was read.
    pub fn row_count(&self) -> Option<u64> {
        match &self.outcome {
            TableOutcome::Ok { row_count, .. } => Some(*row_count),
            TableOutcome::Failed { .. } => None,
        }
    }

    /// Sampled records, present iff the table was read.
    pub fn sample(&self) -> Option<&[Record]> {
        match &self.outcome {
            TableOutcome::Ok { sample, .. } => Some(sample),
            TableOutcome::Failed { .. } => None,
        }
    }

    /// Error text, present iff the table failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            TableOutcome::Ok { .. } => None,
            TableOutcome::Failed { error } => Some(error),
        }
    }
}

/// Reports for every table discovered at the start of a scan, in discovery order.
///
/// Each report is filed under its bare table name. When the result holds the
/// same bare name from more than one schema, those reports are filed under
/// `schema.name` instead so that every key stays unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    reports: Vec<TableReport>,
}

impl ScanResult {
    /// Number of tables in the result.
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// True when the scanned schema had no tables.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Looks up the report filed under `key` (see [`ScanResult::key_of`]).
    pub fn get(&self, key: &str) -> Option<&TableReport> {
        self.reports.iter().find(|r| self.key_of(&r.name) == key)
    }

    /// Key a table's report is filed under in this result.
    pub fn key_of(&self, table: &TableName) -> String {
        let shared = self
            .reports
            .iter()
            .filter(|r| r.name.as_str() == table.as_str())
            .nth(1)
            .is_some();
        if shared {
            table.qualified()
        } else {
            table.as_str().to_string()
        }
    }

    /// True if a report is filed under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Reports in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, TableReport> {
        self.reports.iter()
    }

    /// Table names in discovery order.
    pub fn table_names(&self) -> impl Iterator<Item = &TableName> {
        self.reports.iter().map(|r| &r.name)
    }

    /// Reports with status Failed.
    pub fn failures(&self) -> impl Iterator<Item = &TableReport> {
        self.reports
            .iter()
            .filter(|r| r.status() == TableStatus::Failed)
    }

    /// Number of tables read successfully.
    pub fn ok_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.status() == TableStatus::Ok)
            .count()
    }
}

impl FromIterator<TableReport> for ScanResult {
    fn from_iter<I: IntoIterator<Item = TableReport>>(iter: I) -> Self {
        Self {
            reports: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = &'a TableReport;
    type IntoIter = std::slice::Iter<'a, TableReport>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.iter()
    }
}

impl Serialize for ScanResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.reports.len()))?;
        for report in &self.reports {
            map.serialize_entry(&self.key_of(&report.name), &report.outcome)?;
        }
        map.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[path = "models_tests.rs"]
mod tests;
