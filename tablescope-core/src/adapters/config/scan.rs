//! Scan configuration.

use crate::models::DatabaseType;
use serde::{Deserialize, Serialize};

/// Records sampled per non-empty table unless configured otherwise.
pub const DEFAULT_SAMPLE_LIMIT: u32 = 2;

/// Upper bound on the per-table sample; keeps a diagnostic scan cheap.
pub const MAX_SAMPLE_LIMIT: u32 = 10_000;

/// Controls what a scan looks at.
///
/// # Example
/// ```rust
/// use tablescope_core::DatabaseType;
/// use tablescope_core::adapters::ScanConfig;
///
/// let config = ScanConfig::new().with_schema("reporting").with_sample_limit(5);
/// assert_eq!(config.schema_or_default(DatabaseType::PostgreSQL), "reporting");
/// assert_eq!(ScanConfig::new().schema_or_default(DatabaseType::SQLite), "main");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Schema to enumerate. `None` means the engine default (`public` on
    /// PostgreSQL, `main` on SQLite).
    pub schema: Option<String>,
    /// Maximum records fetched per table; 0 disables sampling.
    pub sample_limit: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            schema: None,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

impl ScanConfig {
    /// Creates a scan config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Builder method to set the per-table sample limit.
    pub fn with_sample_limit(mut self, limit: u32) -> Self {
        self.sample_limit = limit;
        self
    }

    /// Schema name, falling back to the engine's default schema.
    pub fn schema_or_default(&self, database_type: DatabaseType) -> &str {
        self.schema
            .as_deref()
            .unwrap_or(database_type.default_schema())
    }

    /// Validates the scan settings.
    ///
    /// # Errors
    /// Returns a configuration error for an empty schema name or a sample
    /// limit above [`MAX_SAMPLE_LIMIT`].
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(schema) = &self.schema
            && schema.trim().is_empty()
        {
            return Err(crate::error::TableScopeError::configuration(
                "schema cannot be empty",
            ));
        }

        if self.sample_limit > MAX_SAMPLE_LIMIT {
            return Err(crate::error::TableScopeError::configuration(format!(
                "sample limit {} exceeds maximum of {MAX_SAMPLE_LIMIT}",
                self.sample_limit
            )));
        }

        Ok(())
    }
}
