//! End-to-end scan tests against SQLite.
//!
//! This test suite covers:
//! - Row counts and bounded samples for populated and empty tables
//! - Per-table failure isolation (table dropped after discovery)
//! - Connection failures before discovery
//! - Identifier quoting for awkward table names
//! - Repeatable scans and JSON output shape
//! - File-backed databases opened through the adapter factory

#![allow(clippy::unwrap_used)]
#![allow(clippy::uninlined_format_args)]

#![cfg(feature = "sqlite")]

use serde_json::json;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tablescope_core::{
    ScanConfig, TableScopeError, TableStatus, Value,
    adapters::{ConnectionConfig, create_adapter, sqlite::SqliteAdapter},
    discover_tables, scan, scan_tables,
};

/// Single-connection in-memory pool so every statement sees the same database.
async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

async fn execute(pool: &SqlitePool, sql: &str) {
    sqlx::query(sql).execute(pool).await.unwrap();
}

/// `users` with three rows and an empty `orders`.
async fn users_and_orders() -> SqliteAdapter {
    let pool = memory_pool().await;
    execute(
        &pool,
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
    )
    .await;
    execute(
        &pool,
        "INSERT INTO users (name) VALUES ('ada'), ('grace'), ('linus')",
    )
    .await;
    execute(
        &pool,
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, total REAL)",
    )
    .await;

    SqliteAdapter::from_pool(pool, ConnectionConfig::default())
}

// =============================================================================
// Counting and sampling
// =============================================================================

#[tokio::test]
async fn test_scan_users_and_orders() {
    let adapter = users_and_orders().await;

    let result = scan(&adapter, &ScanConfig::default()).await.unwrap();

    assert_eq!(result.len(), 2);

    let users = result.get("users").unwrap();
    assert_eq!(users.status(), TableStatus::Ok);
    assert_eq!(users.row_count(), Some(3));
    let sample = users.sample().unwrap();
    assert_eq!(sample.len(), 2);
    for record in sample {
        assert!(matches!(record.get("id"), Some(Value::Integer(_))));
        assert!(matches!(record.get("name"), Some(Value::Text(_))));
    }

    let orders = result.get("orders").unwrap();
    assert_eq!(orders.status(), TableStatus::Ok);
    assert_eq!(orders.row_count(), Some(0));
    assert!(orders.sample().unwrap().is_empty());
}

#[tokio::test]
async fn test_sample_is_min_of_rows_and_limit() {
    let pool = memory_pool().await;
    execute(&pool, "CREATE TABLE single (v TEXT)").await;
    execute(&pool, "INSERT INTO single VALUES ('only')").await;
    execute(&pool, "CREATE TABLE plenty (v INTEGER)").await;
    for i in 0..25 {
        execute(&pool, &format!("INSERT INTO plenty VALUES ({})", i)).await;
    }
    let adapter = SqliteAdapter::from_pool(pool, ConnectionConfig::default());

    for limit in [1, 2, 10] {
        let config = ScanConfig::new().with_sample_limit(limit);
        let result = scan(&adapter, &config).await.unwrap();

        assert_eq!(result.get("single").unwrap().sample().unwrap().len(), 1);
        assert_eq!(
            result.get("plenty").unwrap().sample().unwrap().len(),
            limit as usize
        );
        assert_eq!(result.get("plenty").unwrap().row_count(), Some(25));
    }
}

#[tokio::test]
async fn test_empty_database_yields_empty_result() {
    let adapter = SqliteAdapter::from_pool(memory_pool().await, ConnectionConfig::default());

    let result = scan(&adapter, &ScanConfig::default()).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(serde_json::to_value(&result).unwrap(), json!({}));
}

// =============================================================================
// Failure isolation
// =============================================================================

#[tokio::test]
async fn test_table_dropped_after_discovery_fails_alone() {
    let pool = memory_pool().await;
    execute(&pool, "CREATE TABLE archive (id INTEGER)").await;
    execute(&pool, "CREATE TABLE current (id INTEGER)").await;
    execute(&pool, "INSERT INTO current VALUES (1), (2)").await;
    let adapter = SqliteAdapter::from_pool(pool.clone(), ConnectionConfig::default());

    let tables = discover_tables(&adapter, &ScanConfig::default())
        .await
        .unwrap();
    assert_eq!(tables.len(), 2);

    execute(&pool, "DROP TABLE archive").await;

    let result = scan_tables(&adapter, &tables, 2).await;

    assert_eq!(result.len(), 2);
    let archive = result.get("archive").unwrap();
    assert_eq!(archive.status(), TableStatus::Failed);
    assert!(!archive.error().unwrap().is_empty());

    let current = result.get("current").unwrap();
    assert_eq!(current.status(), TableStatus::Ok);
    assert_eq!(current.row_count(), Some(2));
    assert_eq!(current.sample().unwrap().len(), 2);
}

#[tokio::test]
async fn test_closed_connection_fails_before_discovery() {
    let adapter = users_and_orders().await;
    adapter.close().await;

    let err = scan(&adapter, &ScanConfig::default()).await.unwrap_err();

    assert!(matches!(err, TableScopeError::Connection { .. }));
}

#[tokio::test]
async fn test_unknown_schema_is_a_configuration_error() {
    let adapter = users_and_orders().await;

    let err = scan(&adapter, &ScanConfig::new().with_schema("nosuch"))
        .await
        .unwrap_err();

    assert!(matches!(err, TableScopeError::Configuration { .. }));
}

// =============================================================================
// Schemas
// =============================================================================

#[tokio::test]
async fn test_attached_schema_is_scanned_by_name() {
    let pool = memory_pool().await;
    execute(&pool, "ATTACH DATABASE ':memory:' AS audit").await;
    execute(&pool, "CREATE TABLE audit.events (id INTEGER)").await;
    execute(&pool, "INSERT INTO audit.events VALUES (1), (2), (3)").await;
    execute(&pool, "CREATE TABLE main.events (id INTEGER)").await;
    let adapter = SqliteAdapter::from_pool(pool, ConnectionConfig::default());

    let result = scan(&adapter, &ScanConfig::new().with_schema("audit"))
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.get("events").unwrap().row_count(), Some(3));
}

#[tokio::test]
async fn test_same_name_in_two_schemas_gets_qualified_keys() {
    let pool = memory_pool().await;
    execute(&pool, "ATTACH DATABASE ':memory:' AS audit").await;
    execute(&pool, "CREATE TABLE audit.events (id INTEGER)").await;
    execute(&pool, "INSERT INTO audit.events VALUES (1), (2), (3)").await;
    execute(&pool, "CREATE TABLE main.events (id INTEGER)").await;
    let adapter = SqliteAdapter::from_pool(pool, ConnectionConfig::default());

    let mut tables = discover_tables(&adapter, &ScanConfig::new().with_schema("main"))
        .await
        .unwrap();
    tables.extend(
        discover_tables(&adapter, &ScanConfig::new().with_schema("audit"))
            .await
            .unwrap(),
    );
    let result = scan_tables(&adapter, &tables, 2).await;

    assert_eq!(result.len(), 2);
    assert!(!result.contains("events"));
    assert_eq!(result.get("main.events").unwrap().row_count(), Some(0));
    assert_eq!(result.get("audit.events").unwrap().row_count(), Some(3));

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value.as_object().unwrap().len(), 2);
    assert_eq!(value["audit.events"]["row_count"], 3);
}

// =============================================================================
// Identifiers
// =============================================================================

#[tokio::test]
async fn test_awkward_table_names_are_quoted() {
    let pool = memory_pool().await;
    execute(&pool, r#"CREATE TABLE "Mixed Case" (v INTEGER)"#).await;
    execute(&pool, r#"INSERT INTO "Mixed Case" VALUES (1)"#).await;
    execute(&pool, r#"CREATE TABLE "say ""hi""" (v INTEGER)"#).await;
    execute(&pool, r#"INSERT INTO "say ""hi""" VALUES (1), (2)"#).await;
    execute(&pool, r#"CREATE TABLE "select" (v INTEGER)"#).await;
    let adapter = SqliteAdapter::from_pool(pool, ConnectionConfig::default());

    let result = scan(&adapter, &ScanConfig::default()).await.unwrap();

    assert_eq!(result.len(), 3);
    assert!(result.failures().next().is_none());
    assert_eq!(result.get("Mixed Case").unwrap().row_count(), Some(1));
    assert_eq!(result.get(r#"say "hi""#).unwrap().row_count(), Some(2));
    assert_eq!(result.get("select").unwrap().row_count(), Some(0));
}

#[tokio::test]
async fn test_parsed_name_cannot_inject_sql() {
    let adapter = users_and_orders().await;
    let hostile =
        tablescope_core::TableName::parse("users; DROP TABLE orders; --").unwrap();

    let result = scan_tables(&adapter, &[hostile], 2).await;
    assert_eq!(
        result.get("users; DROP TABLE orders; --").unwrap().status(),
        TableStatus::Failed
    );

    let after = scan(&adapter, &ScanConfig::default()).await.unwrap();
    assert!(after.contains("orders"));
}

// =============================================================================
// Repeatability and output
// =============================================================================

#[tokio::test]
async fn test_repeated_scans_agree() {
    let adapter = users_and_orders().await;

    let first = scan(&adapter, &ScanConfig::default()).await.unwrap();
    let second = scan(&adapter, &ScanConfig::default()).await.unwrap();

    let names: Vec<_> = first.table_names().collect();
    assert_eq!(names, second.table_names().collect::<Vec<_>>());
    for report in &first {
        let other = second.get(report.name().as_str()).unwrap();
        assert_eq!(report.row_count(), other.row_count());
    }
}

#[tokio::test]
async fn test_scan_result_json_shape() {
    let adapter = users_and_orders().await;

    let result = scan(&adapter, &ScanConfig::new().with_sample_limit(1))
        .await
        .unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["orders"], json!({"status": "ok", "row_count": 0, "sample": []}));
    assert_eq!(value["users"]["status"], "ok");
    assert_eq!(value["users"]["row_count"], 3);
    assert_eq!(value["users"]["sample"].as_array().unwrap().len(), 1);
    assert!(value["users"]["sample"][0]["name"].is_string());
}

// =============================================================================
// File-backed databases
// =============================================================================

#[tokio::test]
async fn test_file_database_through_factory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let writer = SqlitePool::connect(&url).await.unwrap();
    execute(&writer, "CREATE TABLE items (sku TEXT, qty INTEGER)").await;
    execute(&writer, "INSERT INTO items VALUES ('a-1', 4), ('b-2', 0)").await;
    writer.close().await;

    let adapter = create_adapter(path.to_str().unwrap()).await.unwrap();
    adapter.test_connection().await.unwrap();

    let result = scan(adapter.as_ref(), &ScanConfig::default()).await.unwrap();
    assert_eq!(result.get("items").unwrap().row_count(), Some(2));
    assert!(adapter.connection_config().read_only);
}

#[tokio::test]
async fn test_file_database_is_opened_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ro.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let writer = SqlitePool::connect(&url).await.unwrap();
    execute(&writer, "CREATE TABLE t (v INTEGER)").await;
    writer.close().await;

    let adapter = SqliteAdapter::new(path.to_str().unwrap()).await.unwrap();
    let write = sqlx::query("INSERT INTO t VALUES (1)")
        .execute(&adapter.pool)
        .await;
    assert!(write.is_err());
}
