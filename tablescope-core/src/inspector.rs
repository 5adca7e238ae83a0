//! Table discovery and per-table inspection.
//!
//! A scan lists the tables of one schema, then visits each table in turn:
//! one `COUNT(*)`, and for non-empty tables one bounded `SELECT *`. A table
//! that cannot be read becomes a failed entry in the [`ScanResult`]; only a
//! failure to list the tables at all aborts the scan.
//!
//! Statements are awaited one at a time. Nothing here spawns tasks, adds
//! timeouts, or closes the adapter.

use crate::Result;
use crate::adapters::{DatabaseAdapter, ScanConfig};
use crate::models::{ScanResult, TableName, TableReport, TableSnapshot};
use tracing::{debug, info, warn};

/// Lists the tables of the configured schema, ordered by name.
///
/// # Errors
/// Returns [`crate::TableScopeError::Connection`] if the catalog cannot be
/// queried, or a configuration error if `config` is invalid.
pub async fn discover_tables(
    adapter: &dyn DatabaseAdapter,
    config: &ScanConfig,
) -> Result<Vec<TableName>> {
    config.validate()?;

    let database_type = adapter.database_type();
    let tables = adapter.list_tables(config.schema.as_deref()).await?;
    debug!(
        "Discovered {} tables in {} schema '{}'",
        tables.len(),
        database_type,
        config.schema_or_default(database_type)
    );

    Ok(tables)
}

/// Discovers every table and inspects each one.
///
/// # Example
/// ```rust,no_run
/// # async fn run() -> tablescope_core::Result<()> {
/// use tablescope_core::adapters::{ScanConfig, create_adapter};
///
/// let adapter = create_adapter("sqlite:///var/lib/app/app.db").await?;
/// let result = tablescope_core::inspector::scan(adapter.as_ref(), &ScanConfig::default()).await?;
/// for report in &result {
///     println!("{}: {:?}", report.name(), report.row_count());
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// Fails only when discovery fails; per-table problems are recorded in the
/// returned [`ScanResult`].
pub async fn scan(adapter: &dyn DatabaseAdapter, config: &ScanConfig) -> Result<ScanResult> {
    let tables = discover_tables(adapter, config).await?;
    let result = scan_tables(adapter, &tables, config.sample_limit).await;

    info!(
        "Scanned {} tables: {} ok, {} failed",
        result.len(),
        result.ok_count(),
        result.failures().count()
    );

    Ok(result)
}

/// Inspects the given tables in order, producing exactly one report each.
///
/// Names are always quoted when interpolated, so names from
/// [`TableName::parse`] are safe here; the expected source is
/// [`discover_tables`] on the same adapter.
pub async fn scan_tables(
    adapter: &dyn DatabaseAdapter,
    tables: &[TableName],
    sample_limit: u32,
) -> ScanResult {
    let mut reports = Vec::with_capacity(tables.len());

    for table in tables {
        let result = inspect_table(adapter, table, sample_limit).await;
        if let Err(e) = &result {
            warn!("Skipping table '{table}': {e}");
        }
        reports.push(TableReport::from_result(table.clone(), result));
    }

    reports.into_iter().collect()
}

/// Counts one table and samples it when it has rows.
///
/// # Errors
/// Propagates the first failing statement's error.
pub async fn inspect_table(
    adapter: &dyn DatabaseAdapter,
    table: &TableName,
    sample_limit: u32,
) -> Result<TableSnapshot> {
    let row_count = adapter.count_rows(table).await?;

    let sample = if row_count > 0 && sample_limit > 0 {
        adapter.sample_rows(table, sample_limit).await?
    } else {
        Vec::new()
    };

    debug!("Table '{table}': {row_count} rows, {} sampled", sample.len());

    Ok(TableSnapshot { row_count, sample })
}
