//! SQLite database adapter.
//!
//! # Module Structure
//! - `connection`: Connection handling (single connection, read-only files)
//! - `catalog`: Table discovery via `sqlite_master`, counting and sampling
//! - `values`: Storage-class driven row decoding
//!
//! # SQLite-Specific Behavior
//! - The default schema is `main`; attached databases can be scanned by name
//! - Internal `sqlite_*` tables are never reported

mod catalog;
pub mod connection;
mod values;


use super::{ConnectionConfig, DatabaseAdapter};
use crate::Result;
use crate::models::{DatabaseType, Record, TableName};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// SQLite database adapter.
pub struct SqliteAdapter {
    /// Connection pool (single connection)
    pub pool: SqlitePool,
    /// Connection configuration
    pub config: ConnectionConfig,
    /// Connection string as given; empty for wrapped pools
    pub connection_string: String,
}

impl std::fmt::Debug for SqliteAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAdapter")
            .field("config", &self.config)
            .field("is_in_memory", &self.is_in_memory())
            // Note: connection_string is intentionally omitted
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DatabaseAdapter for SqliteAdapter {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(crate::error::TableScopeError::connection_failed)?;

        if connectivity_result != 1 {
            return Err(crate::error::TableScopeError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        Ok(())
    }

    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<TableName>> {
        catalog::list_tables(&self.pool, schema).await
    }

    async fn count_rows(&self, table: &TableName) -> Result<u64> {
        catalog::count_rows(&self.pool, table).await
    }

    async fn sample_rows(&self, table: &TableName, limit: u32) -> Result<Vec<Record>> {
        catalog::sample_rows(&self.pool, table, limit).await
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    fn connection_config(&self) -> ConnectionConfig {
        self.config.clone()
    }
}
