//! Database connection configuration.
//!
//! Timeouts live here rather than in the inspector: a scan surfaces whatever
//! error the connection raises and adds no deadlines of its own.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on pooled connections.
pub const MAX_POOL_CONNECTIONS: u32 = 100;

/// Pool and session settings shared by every adapter.
///
/// Where to connect comes from the connection string alone; this struct only
/// shapes how the pool behaves once it has a target.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use tablescope_core::adapters::ConnectionConfig;
///
/// let config = ConnectionConfig::new()
///     .with_query_timeout(Duration::from_secs(5))
///     .with_read_only(true);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Time allowed to establish or acquire a connection
    pub connect_timeout: Duration,
    /// Per-statement timeout (PostgreSQL `statement_timeout`, SQLite busy timeout)
    pub query_timeout: Duration,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// How long an idle pooled connection is kept
    pub idle_timeout: Duration,
    /// Whether to open the session read-only
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(30),
            // One session: statements run strictly one after another.
            max_connections: 1,
            idle_timeout: Duration::from_secs(600),
            read_only: true,
        }
    }
}

impl ConnectionConfig {
    /// Creates a config with safe defaults: read-only, one connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns a configuration error for an empty or oversized pool, or a
    /// zero timeout.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_connections == 0 {
            return Err(crate::error::TableScopeError::configuration(
                "max_connections must be greater than 0",
            ));
        }

        if self.max_connections > MAX_POOL_CONNECTIONS {
            return Err(crate::error::TableScopeError::configuration(format!(
                "max_connections should not exceed {MAX_POOL_CONNECTIONS}"
            )));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::TableScopeError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.query_timeout.as_millis() == 0 {
            return Err(crate::error::TableScopeError::configuration(
                "query_timeout must be at least 1ms",
            ));
        }

        Ok(())
    }

    /// Builder method to set the per-statement timeout.
    #[must_use]
    pub const fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Builder method to set the connect/acquire timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set the pool size.
    #[must_use]
    pub const fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Builder method to toggle read-only sessions.
    #[must_use]
    pub const fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}
