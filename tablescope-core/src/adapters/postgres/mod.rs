//! PostgreSQL database adapter.
//!
//! # Module Structure
//! - `connection`: Connection pool management and validation
//! - `catalog`: Table discovery via `information_schema`, counting and sampling
//! - `values`: Type-directed row decoding
//!
//! # Security Guarantees
//! - Sessions are read-only by default (`default_transaction_read_only`)
//! - Connection strings are sanitized in error messages
//! - `statement_timeout` bounds every statement

mod catalog;
mod connection;
mod values;


use super::{ConnectionConfig, DatabaseAdapter};
use crate::Result;
use crate::models::{DatabaseType, Record, TableName};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL database adapter
pub struct PostgresAdapter {
    /// Connection pool
    pub pool: PgPool,
    /// Connection configuration
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for PostgresAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAdapter")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl DatabaseAdapter for PostgresAdapter {
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
        catalog::list_tables(&self.pool, schema.unwrap_or(DatabaseType::PostgreSQL.default_schema())).await
    }

    async fn count_rows(&self, table: &TableName) -> Result<u64> {
        catalog::count_rows(&self.pool, table).await
    }

    async fn sample_rows(&self, table: &TableName, limit: u32) -> Result<Vec<Record>> {
        catalog::sample_rows(&self.pool, table, limit).await
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::PostgreSQL
    }

    fn connection_config(&self) -> ConnectionConfig {
        self.config.clone()
    }
}
