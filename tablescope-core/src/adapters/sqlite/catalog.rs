//! SQLite table discovery, counting and sampling.
//!
//! Tables come from `sqlite_master` of the main database (or of an attached
//! database when a schema is given). SQLite's own bookkeeping tables
//! (`sqlite_sequence`, `sqlite_stat1`, ...) are not user tables and are skipped.

use super::values::decode_row;
use crate::Result;
use crate::error::TableScopeError;
use crate::models::{DatabaseType, Record, TableName, quote_identifier};
use sqlx::SqlitePool;

/// Lists user tables, ordered by name.
///
/// A schema that is neither `main`, `temp` nor an attached database is a
/// configuration error rather than an empty list.
pub(crate) async fn list_tables(pool: &SqlitePool, schema: Option<&str>) -> Result<Vec<TableName>> {
    let master = match schema {
        Some(schema) => {
            ensure_schema_exists(pool, schema).await?;
            format!("{}.sqlite_master", quote_identifier(schema))
        }
        None => "sqlite_master".to_string(),
    };
    let query = format!(
        "SELECT name FROM {master} WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY name"
    );

    let names: Vec<String> = sqlx::query_scalar(&query)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            TableScopeError::connection_context(
                format!(
                    "Failed to list tables in schema '{}'",
                    schema.unwrap_or(DatabaseType::SQLite.default_schema())
                ),
                e,
            )
        })?;

    tracing::debug!("Discovered {} SQLite tables", names.len());

    Ok(names
        .into_iter()
        .map(|name| TableName::from_catalog(schema.map(str::to_string), name))
        .collect())
}

async fn ensure_schema_exists(pool: &SqlitePool, schema: &str) -> Result<()> {
    let attached: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_database_list WHERE name = ? COLLATE NOCASE",
    )
    .bind(schema)
    .fetch_one(pool)
    .await
    .map_err(|e| TableScopeError::connection_context("Failed to list attached databases", e))?;

    if attached == 0 {
        return Err(TableScopeError::configuration(format!(
            "Unknown SQLite schema '{schema}': not main, temp or an attached database"
        )));
    }

    Ok(())
}

/// Exact row count via `COUNT(*)`.
pub(crate) async fn count_rows(pool: &SqlitePool, table: &TableName) -> Result<u64> {
    let query = format!("SELECT COUNT(*) FROM {}", table.quoted());

    let count: i64 = sqlx::query_scalar(&query)
        .fetch_one(pool)
        .await
        .map_err(|e| TableScopeError::table_access(table.as_str(), "count query failed", e))?;

    u64::try_from(count)
        .map_err(|e| TableScopeError::table_access(table.as_str(), "count query returned a negative count", e))
}

/// Up to `limit` rows with no ORDER BY.
pub(crate) async fn sample_rows(
    pool: &SqlitePool,
    table: &TableName,
    limit: u32,
) -> Result<Vec<Record>> {
    let query = format!("SELECT * FROM {} LIMIT ?", table.quoted());

    let rows = sqlx::query(&query)
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await
        .map_err(|e| TableScopeError::table_access(table.as_str(), "sample query failed", e))?;

    Ok(rows.iter().map(decode_row).collect())
}
