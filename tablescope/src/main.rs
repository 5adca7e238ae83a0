//! tablescope binary.
//!
//! Scans one schema of a PostgreSQL or SQLite database and prints a report
//! with the row count and a few sample records of every table.
//!
//! # Security Guarantees
//! - Read-only database operations only
//! - The connection URL is only ever logged with its password masked

use anyhow::Context;
use clap::Parser;
use tablescope::output::{render, write_output};
use tablescope::{Cli, Command, MISSING_DATABASE_URL};
use tablescope_core::{
    adapters::create_adapter, error::redact_database_url, inspector, logging::init_logging,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is not an error; real environment variables win.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let Some(database_url) = cli.database_url() else {
        eprintln!("Error: {MISSING_DATABASE_URL}");
        eprintln!("Use --database-url, set DATABASE_URL, or add it to a .env file");
        std::process::exit(1);
    };

    match &cli.command {
        Some(Command::Test(_)) => test_connection(database_url).await,
        None => run_scan(database_url, &cli).await,
    }
}

/// Tests database connection without scanning
async fn test_connection(database_url: &str) -> anyhow::Result<()> {
    info!("Testing connection to {}", redact_database_url(database_url));

    let adapter = create_adapter(database_url)
        .await
        .context("Failed to create database adapter")?;

    adapter.test_connection().await.map_err(|e| {
        error!("Connection test failed: {e}");
        e
    })?;

    println!(
        "Connection to {} database successful",
        adapter.database_type()
    );

    Ok(())
}

/// Scans the database and writes the report
async fn run_scan(database_url: &str, cli: &Cli) -> anyhow::Result<()> {
    let config = cli.scan_config();
    config.validate().context("Invalid scan options")?;
    info!("Target: {}", redact_database_url(database_url));

    let adapter = create_adapter(database_url)
        .await
        .context("Failed to create database adapter")?;

    let result = inspector::scan(adapter.as_ref(), &config)
        .await
        .context("Table discovery failed")?;

    let rendered = render(&result, cli.format)?;
    write_output(&rendered, cli.output.as_deref()).await?;

    Ok(())
}
