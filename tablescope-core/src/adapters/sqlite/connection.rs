//! SQLite connection handling.
//!
//! # Connection Modes
//! - File-based: `sqlite:///path/to/database.db` or `sqlite://./relative.db`
//! - Bare paths ending in `.db`, `.sqlite` or `.sqlite3`
//! - In-memory: `sqlite::memory:` or `:memory:`
//!
//! File databases are opened read-only by default; a missing file is an
//! error rather than an empty new database.

use super::{ConnectionConfig, SqliteAdapter};
use crate::adapters::MAX_POOL_CONNECTIONS;
use crate::Result;
use crate::error::TableScopeError;
use sqlx::SqlitePool;
use url::Url;

impl SqliteAdapter {
    /// Creates a new SQLite adapter from a connection string.
    ///
    /// # Errors
    /// Returns error if:
    /// - Connection string format is invalid
    /// - Database file does not exist (for file-based DBs)
    /// - Database cannot be opened
    pub async fn new(connection_string: &str) -> Result<Self> {
        validate_sqlite_connection_string(connection_string)?;
        let config = ConnectionConfig::default();
        let pool = create_sqlite_connection(connection_string, &config).await?;

        Ok(Self {
            pool,
            config,
            connection_string: connection_string.to_string(),
        })
    }

    /// Creates a new SQLite adapter with custom configuration.
    ///
    /// `query_timeout` becomes the busy timeout; `read_only` opens the file
    /// with `SQLITE_OPEN_READONLY`.
    ///
    /// # Errors
    /// Returns error if the configuration or connection string is invalid,
    /// or the database cannot be opened.
    pub async fn with_config(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        validate_sqlite_connection_string(connection_string)?;
        let pool = create_sqlite_connection(connection_string, &config).await?;

        Ok(Self {
            pool,
            config,
            connection_string: connection_string.to_string(),
        })
    }

    /// Wraps a pool the caller already opened. The caller keeps ownership of
    /// its lifetime; scanning never closes it. The connection string is
    /// unknown, so [`SqliteAdapter::is_in_memory`] reports `false`.
    pub fn from_pool(pool: SqlitePool, config: ConnectionConfig) -> Self {
        Self {
            pool,
            config,
            connection_string: String::new(),
        }
    }

    /// Checks if the connection is to an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.connection_string.contains(":memory:")
            || self.connection_string.contains("mode=memory")
    }

    /// Closes the connection gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Validates SQLite connection string format.
///
/// # Errors
/// Returns error if connection string is invalid
pub fn validate_sqlite_connection_string(connection_string: &str) -> Result<()> {
    if connection_string == ":memory:" {
        return Ok(());
    }

    if connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        return Ok(());
    }

    if connection_string.starts_with("sqlite:") {
        if connection_string.contains(":memory:") || connection_string.contains("mode=memory") {
            return Ok(());
        }

        if let Ok(url) = Url::parse(connection_string) {
            if url.scheme() != "sqlite" {
                return Err(TableScopeError::configuration(
                    "Connection string must use sqlite:// scheme",
                ));
            }
            return Ok(());
        }

        if connection_string.starts_with("sqlite://") {
            return Ok(());
        }
    }

    Err(TableScopeError::configuration(
        "Invalid SQLite connection string format: expected sqlite:// URL, file path, or :memory:",
    ))
}

/// Normalizes a connection string to SQLite URL format.
fn normalize_connection_string(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        return "sqlite::memory:".to_string();
    }

    if connection_string.starts_with("sqlite:") {
        return connection_string.to_string();
    }

    format!("sqlite://{connection_string}")
}

/// Opens the pool with the configured timeouts and access mode.
async fn create_sqlite_connection(
    connection_string: &str,
    config: &ConnectionConfig,
) -> Result<SqlitePool> {
    use sqlx::sqlite::SqliteConnectOptions;
    use std::str::FromStr;

    let normalized = normalize_connection_string(connection_string);

    let mut options = SqliteConnectOptions::from_str(&normalized)
        .map_err(|e| {
            TableScopeError::configuration(format!("Invalid SQLite connection string: {e}"))
        })?
        .busy_timeout(config.query_timeout)
        .create_if_missing(false);

    if config.read_only {
        options = options.read_only(true);
    }

    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.max_connections.clamp(1, MAX_POOL_CONNECTIONS))
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .connect_with(options)
        .await
        .map_err(|e| TableScopeError::connection_context("Failed to open SQLite database", e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sqlite_connection_string_memory() {
        assert!(validate_sqlite_connection_string(":memory:").is_ok());
        assert!(validate_sqlite_connection_string("sqlite::memory:").is_ok());
        assert!(validate_sqlite_connection_string("sqlite://:memory:").is_ok());
    }

    #[test]
    fn test_validate_sqlite_connection_string_file() {
        assert!(validate_sqlite_connection_string("sqlite:///path/to/db.sqlite").is_ok());
        assert!(validate_sqlite_connection_string("sqlite://./test.db").is_ok());
        assert!(validate_sqlite_connection_string("/path/to/database.db").is_ok());
        assert!(validate_sqlite_connection_string("data.sqlite3").is_ok());
    }

    #[test]
    fn test_validate_sqlite_connection_string_invalid() {
        assert!(validate_sqlite_connection_string("postgres://localhost/db").is_err());
        assert!(validate_sqlite_connection_string("invalid").is_err());
    }

    #[test]
    fn test_normalize_connection_string() {
        assert_eq!(normalize_connection_string(":memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_connection_string("sqlite:///path/db.sqlite"),
            "sqlite:///path/db.sqlite"
        );
        assert_eq!(
            normalize_connection_string("/path/to/db.sqlite"),
            "sqlite:///path/to/db.sqlite"
        );
    }

    #[tokio::test]
    async fn test_new_uses_default_pool_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("present.db");
        let seed = SqlitePool::connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap();
        seed.close().await;

        let adapter = SqliteAdapter::new(path.to_str().unwrap()).await.unwrap();
        assert_eq!(adapter.config, ConnectionConfig::default());
        assert!(!adapter.is_in_memory());
    }

    #[tokio::test]
    async fn test_with_config_rejects_invalid_config() {
        let config = ConnectionConfig::new().with_max_connections(0);
        let err = SqliteAdapter::with_config(":memory:", config)
            .await
            .unwrap_err();
        assert!(matches!(err, TableScopeError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");

        let err = SqliteAdapter::new(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, TableScopeError::Connection { .. }));
    }
}
