//! Rendering and writing scan reports.

use crate::OutputFormat;
use std::path::Path;
use tablescope_core::error::TableScopeError;
use tablescope_core::{Result, ScanResult, TableOutcome};

/// Renders a scan result in the requested format.
///
/// # Errors
/// Returns a serialization error if the JSON encoder fails.
pub fn render(result: &ScanResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => render_json(result),
        OutputFormat::Text => Ok(render_text(result)),
    }
}

/// Pretty-printed JSON object keyed by table name.
pub fn render_json(result: &ScanResult) -> Result<String> {
    let mut json =
        serde_json::to_string_pretty(result).map_err(|e| TableScopeError::Serialization {
            context: "scan result".to_string(),
            source: e,
        })?;
    json.push('\n');
    Ok(json)
}

/// One line per table: `name: N rows, k sampled` or `name: FAILED (error)`.
///
/// Names are the same keys the JSON form uses.
pub fn render_text(result: &ScanResult) -> String {
    result
        .iter()
        .map(|report| {
            let key = result.key_of(report.name());
            match report.outcome() {
                TableOutcome::Ok { row_count, sample } => {
                    format!("{key}: {row_count} rows, {} sampled\n", sample.len())
                }
                TableOutcome::Failed { error } => format!("{key}: FAILED ({error})\n"),
            }
        })
        .collect()
}

/// Writes rendered output to `path`, or to stdout when `None`.
///
/// # Errors
/// Returns an I/O error if the file cannot be written.
pub async fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            tokio::fs::write(path, content)
                .await
                .map_err(|e| TableScopeError::Io {
                    context: format!("Failed to write to {}", path.display()),
                    source: e,
                })?;
            tracing::info!("Report written to {}", path.display());
        }
        None => {
            use tokio::io::AsyncWriteExt;

            let stdout_error = |e| TableScopeError::Io {
                context: "Failed to write to stdout".to_string(),
                source: e,
            };
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(content.as_bytes())
                .await
                .map_err(stdout_error)?;
            stdout.flush().await.map_err(stdout_error)?;
        }
    }
    Ok(())
}
