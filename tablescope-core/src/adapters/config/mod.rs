//! Configuration types for database adapters and scans.
//!
//! - `ConnectionConfig`: pool and session settings
//! - `ScanConfig`: which schema to scan and how many records to sample
//!
//! # Security
//! These configuration structs intentionally do NOT store passwords or credentials.

mod connection;
mod scan;

pub use connection::{ConnectionConfig, MAX_POOL_CONNECTIONS};
pub use scan::{DEFAULT_SAMPLE_LIMIT, MAX_SAMPLE_LIMIT, ScanConfig};
