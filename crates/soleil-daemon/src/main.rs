//! Soleil horizon batch - precomputes obstruction profiles
//!
//! This binary coordinates:
//! - Loading venues that have no horizon profile yet
//! - Computing profiles on a pool of workers, one database connection each
//! - Saving profiles in transactional batches

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use soleil_batch::run_batch;
use soleil_config::AppConfig;
use soleil_db::{DbClient, PgObstacleSourceFactory};

use crate::config::{Args, DaemonConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    soleil_obs::init("soleil-horizons");

    let file_config = AppConfig::load().context("Failed to load configuration")?;
    let config = DaemonConfig::resolve(&args, &file_config)?;
    info!(
        workers = config.batch.workers,
        batch_size = config.batch.batch_size,
        "Loaded configuration"
    );

    let db_client = DbClient::new(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    db_client.ping().await.context("Database ping failed")?;
    info!("Database connection verified");

    let factory = Arc::new(PgObstacleSourceFactory::new(config.database_url.clone()));

    let result = tokio::select! {
        result = run_batch(&db_client, factory, &config.batch) => Some(result),
        _ = shutdown_signal() => None,
    };

    db_client.close().await;

    match result {
        Some(Ok(report)) => {
            info!(
                computed = report.computed,
                failed = report.failed,
                "Horizon batch finished"
            );
            Ok(())
        }
        Some(Err(e)) => {
            error!("Batch error: {}", e);
            Err(e.into())
        }
        None => {
            info!("Shutdown signal received, saved batches are kept");
            Ok(())
        }
    }
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to setup signal handler");
}
