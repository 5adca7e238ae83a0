//! Database adapter trait and factory.
//!
//! An adapter is the "connection" a scan borrows: it knows how to list the
//! tables of a schema, count a table, and fetch a bounded sample from it on
//! one engine. The inspector only talks to [`DatabaseAdapter`], so the
//! per-table failure handling lives in one place for every engine.
//!
//! # Module Structure
//! - `config`: Configuration types (ConnectionConfig, ScanConfig)
//! - Database-specific modules (postgres, sqlite), each behind its feature

use crate::{
    Result,
    models::{DatabaseType, Record, TableName},
};
use async_trait::async_trait;

pub mod config;

pub use config::{
    ConnectionConfig, DEFAULT_SAMPLE_LIMIT, MAX_POOL_CONNECTIONS, MAX_SAMPLE_LIMIT, ScanConfig,
};

/// Read-only operations a scan needs from a database engine.
///
/// Implementations never close the underlying connection from these methods;
/// the caller owns its lifetime.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn DatabaseAdapter>`.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Tests the database connection with a trivial query.
    ///
    /// # Errors
    /// Returns [`crate::TableScopeError::Connection`] if no statement can be run.
    async fn test_connection(&self) -> Result<()>;

    /// Lists the tables visible in `schema`, or in the engine's default
    /// schema when `None`, ordered by name.
    ///
    /// # Errors
    /// Returns [`crate::TableScopeError::Connection`] if the catalog query fails.
    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<TableName>>;

    /// Counts the rows of one table with `COUNT(*)`.
    ///
    /// # Errors
    /// Returns [`crate::TableScopeError::TableAccess`] on any failure.
    async fn count_rows(&self, table: &TableName) -> Result<u64>;

    /// Fetches up to `limit` rows in whatever order the engine returns them.
    ///
    /// # Errors
    /// Returns [`crate::TableScopeError::TableAccess`] on any failure.
    async fn sample_rows(&self, table: &TableName, limit: u32) -> Result<Vec<Record>>;

    /// Returns the database type this adapter handles.
    fn database_type(&self) -> DatabaseType;

    /// Gets the connection configuration (credentials sanitized).
    fn connection_config(&self) -> ConnectionConfig;
}

/// Creates an adapter for the engine named by `connection_string`.
///
/// # Security
/// The connection string is redacted in every error and log message.
///
/// # Errors
/// Returns error if the format is unrecognized, the engine is not compiled
/// in, or the connection cannot be established.
pub async fn create_adapter(connection_string: &str) -> Result<Box<dyn DatabaseAdapter>> {
    create_adapter_with_config(connection_string, None).await
}

/// Like [`create_adapter`], overriding the configuration parsed from the URL.
pub async fn create_adapter_with_config(
    connection_string: &str,
    config: Option<ConnectionConfig>,
) -> Result<Box<dyn DatabaseAdapter>> {
    let database_type = detect_database_type(connection_string)?;
    tracing::debug!(
        "Creating {} adapter for {}",
        database_type,
        redact_database_url(connection_string)
    );

    match database_type {
        #[cfg(feature = "postgresql")]
        DatabaseType::PostgreSQL => {
            let adapter = match config {
                Some(config) => {
                    postgres::PostgresAdapter::with_config(connection_string, config).await?
                }
                None => postgres::PostgresAdapter::new(connection_string).await?,
            };
            Ok(Box::new(adapter))
        }
        #[cfg(not(feature = "postgresql"))]
        DatabaseType::PostgreSQL => {
            let _ = config;
            Err(crate::error::TableScopeError::unsupported_feature(
                "PostgreSQL adapter",
                "Compile with --features postgresql to enable PostgreSQL support",
            ))
        }
        #[cfg(feature = "sqlite")]
        DatabaseType::SQLite => {
            let adapter = match config {
                Some(config) => sqlite::SqliteAdapter::with_config(connection_string, config).await?,
                None => sqlite::SqliteAdapter::new(connection_string).await?,
            };
            Ok(Box::new(adapter))
        }
        #[cfg(not(feature = "sqlite"))]
        DatabaseType::SQLite => {
            let _ = config;
            Err(crate::error::TableScopeError::unsupported_feature(
                "SQLite adapter",
                "Compile with --features sqlite to enable SQLite support",
            ))
        }
    }
}

/// Safely redacts credentials from database connection URLs.
///
/// Delegates to [`crate::error::redact_database_url`].
#[inline]
pub fn redact_database_url(url: &str) -> String {
    crate::error::redact_database_url(url)
}

/// Detects the database type from a connection string.
///
/// # Errors
/// Returns error if the connection string format is unrecognized
pub fn detect_database_type(connection_string: &str) -> Result<DatabaseType> {
    if connection_string.starts_with("postgres://")
        || connection_string.starts_with("postgresql://")
    {
        Ok(DatabaseType::PostgreSQL)
    } else if connection_string.starts_with("sqlite://")
        || connection_string.starts_with("sqlite:")
        || connection_string == ":memory:"
        || connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        Ok(DatabaseType::SQLite)
    } else {
        Err(crate::error::TableScopeError::configuration(
            "Unrecognized database connection string format",
        ))
    }
}

#[cfg(feature = "postgresql")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;
