//! PostgreSQL connection pool management and validation.
//!
//! Every pooled session is configured in `after_connect`: statement timeout,
//! read-only transactions, application name and a UTC time zone.

use super::{ConnectionConfig, PostgresAdapter};
use crate::adapters::MAX_POOL_CONNECTIONS;
use crate::Result;
use crate::error::TableScopeError;
use sqlx::PgPool;
use std::time::Duration;
use url::Url;

impl PostgresAdapter {
    /// Creates a new PostgreSQL adapter.
    ///
    /// The pool connects lazily, so an unreachable server surfaces on the
    /// first statement (typically [`DatabaseAdapter::test_connection`] or
    /// table discovery) as a connection error.
    ///
    /// [`DatabaseAdapter::test_connection`]: crate::adapters::DatabaseAdapter::test_connection
    ///
    /// # Errors
    /// Returns error if the connection string is malformed.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let config = Self::parse_connection_config(connection_string)?;
        let pool = Self::create_connection_pool(connection_string, &config)?;

        Ok(Self { pool, config })
    }

    /// Creates a new PostgreSQL adapter with custom configuration.
    pub async fn with_config(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Self::validate_connection_string(connection_string)?;
        let pool = Self::create_connection_pool(connection_string, &config)?;

        Ok(Self { pool, config })
    }

    /// Wraps a pool the caller already opened. Scanning never closes it.
    pub fn from_pool(pool: PgPool, config: ConnectionConfig) -> Self {
        Self { pool, config }
    }

    /// Closes the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Reads pool settings from a connection URL's query string.
    ///
    /// Recognized parameters: `connect_timeout` (seconds, 1-300),
    /// `statement_timeout` (milliseconds) and `pool_max_conns` (1-100).
    /// Out-of-range values keep the default.
    ///
    /// # Errors
    /// Returns error if the URL is malformed or names an invalid port.
    pub fn parse_connection_config(connection_string: &str) -> Result<ConnectionConfig> {
        let url = Self::validate_connection_string(connection_string)?;
        let mut config = ConnectionConfig::default();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "connect_timeout" => {
                    if let Ok(timeout_secs) = value.parse::<u64>()
                        && (1..=300).contains(&timeout_secs)
                    {
                        config.connect_timeout = Duration::from_secs(timeout_secs);
                    }
                }
                "statement_timeout" => {
                    if let Ok(timeout_ms) = value.parse::<u64>()
                        && timeout_ms > 0
                    {
                        config.query_timeout = Duration::from_millis(timeout_ms);
                    }
                }
                "pool_max_conns" => {
                    if let Ok(max_conns) = value.parse::<u32>()
                        && (1..=MAX_POOL_CONNECTIONS).contains(&max_conns)
                    {
                        config.max_connections = max_conns;
                    }
                }
                _ => {}
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Validates scheme, host and port of a connection URL.
    ///
    /// # Errors
    /// Returns error if connection string is invalid
    pub fn validate_connection_string(connection_string: &str) -> Result<Url> {
        let url = Url::parse(connection_string).map_err(|e| {
            TableScopeError::configuration(format!(
                "Invalid PostgreSQL connection string format: {e}"
            ))
        })?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(TableScopeError::configuration(
                "Connection string must use postgres:// or postgresql:// scheme",
            ));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(TableScopeError::configuration(
                "Connection string must specify a host",
            ));
        }

        if url.port() == Some(0) {
            return Err(TableScopeError::configuration(
                "Invalid port number: must be greater than 0",
            ));
        }

        Ok(url)
    }

    /// Builds the pool. Session settings are applied to every new connection.
    pub(crate) fn create_connection_pool(
        connection_string: &str,
        config: &ConnectionConfig,
    ) -> Result<PgPool> {
        use sqlx::Executor;

        let statement_timeout_ms = config.query_timeout.as_millis();
        let read_only = config.read_only;

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections.clamp(1, MAX_POOL_CONNECTIONS))
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .test_before_acquire(true)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(format!("SET statement_timeout = {statement_timeout_ms}").as_str())
                        .await?;

                    let app_name = concat!("tablescope-", env!("CARGO_PKG_VERSION"));
                    conn.execute(format!("SET application_name = '{app_name}'").as_str())
                        .await?;

                    if read_only {
                        conn.execute("SET default_transaction_read_only = on")
                            .await?;
                    }

                    conn.execute("SET timezone = 'UTC'").await?;

                    Ok(())
                })
            })
            .connect_lazy(connection_string)
            .map_err(|e| {
                TableScopeError::connection_context(
                    format!(
                        "Failed to create PostgreSQL connection pool to {}",
                        crate::adapters::redact_database_url(connection_string)
                    ),
                    e,
                )
            })
    }
}
