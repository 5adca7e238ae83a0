//! PostgreSQL table discovery, counting and sampling.
//!
//! Discovery reads `information_schema.tables`, which only lists relations
//! the current role has some privilege on. Names come back schema-qualified
//! so every later statement addresses exactly the discovered relation.
//!
//! A schema that does not exist yields an empty table list, the same as a
//! schema the role cannot see; `information_schema` does not tell the two
//! apart. SQLite, by contrast, rejects an unknown schema as a configuration
//! error.

use super::values::decode_row;
use crate::Result;
use crate::error::TableScopeError;
use crate::models::{Record, TableName};
use sqlx::PgPool;

/// Lists the tables of `schema`, ordered by name.
pub(crate) async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<TableName>> {
    let names: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT table_name::text
        FROM information_schema.tables
        WHERE table_schema = $1
        ORDER BY table_name
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        TableScopeError::connection_context(
            format!("Failed to list tables in schema '{schema}'"),
            e,
        )
    })?;

    tracing::debug!(
        "Discovered {} tables in PostgreSQL schema '{}'",
        names.len(),
        schema
    );

    Ok(names
        .into_iter()
        .map(|name| TableName::from_catalog(Some(schema.to_string()), name))
        .collect())
}

/// Exact row count via `COUNT(*)`.
pub(crate) async fn count_rows(pool: &PgPool, table: &TableName) -> Result<u64> {
    let query = format!("SELECT COUNT(*) FROM {}", table.quoted());

    let count: i64 = sqlx::query_scalar(&query)
        .fetch_one(pool)
        .await
        .map_err(|e| TableScopeError::table_access(table.as_str(), "count query failed", e))?;

    u64::try_from(count)
        .map_err(|e| TableScopeError::table_access(table.as_str(), "count query returned a negative count", e))
}

/// Up to `limit` rows with no ORDER BY.
pub(crate) async fn sample_rows(pool: &PgPool, table: &TableName, limit: u32) -> Result<Vec<Record>> {
    let query = format!("SELECT * FROM {} LIMIT $1", table.quoted());

    tracing::trace!("Sampling {} (limit: {limit})", table.quoted());

    let rows = sqlx::query(&query)
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await
        .map_err(|e| TableScopeError::table_access(table.as_str(), "sample query failed", e))?;

    Ok(rows.iter().map(decode_row).collect())
}
