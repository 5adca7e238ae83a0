//! Core library for tablescope.
//!
//! tablescope answers "what is in this database?" for a live connection:
//! it lists the tables of a schema, counts each one, and pulls a small
//! sample of records, without letting one unreadable table spoil the rest
//! of the report.
//!
//! # Security Guarantees
//! - All database operations are read-only (`SELECT` only)
//! - Connection strings are redacted in every log line and error
//! - Table names are always quoted, never interpolated raw
//!
//! # Architecture
//! - [`adapters`]: one [`DatabaseAdapter`] per engine, created by a factory
//!   from the connection URL
//! - [`inspector`]: discovery and per-table inspection over any adapter
//! - [`models`]: scan results and decoded values

pub mod adapters;
pub mod error;
pub mod inspector;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use adapters::{ConnectionConfig, DatabaseAdapter, ScanConfig, create_adapter};
pub use error::{Result, TableScopeError};
pub use inspector::{discover_tables, inspect_table, scan, scan_tables};
pub use models::{
    DatabaseType, Record, ScanResult, TableName, TableOutcome, TableReport, TableSnapshot,
    TableStatus, Value,
};
