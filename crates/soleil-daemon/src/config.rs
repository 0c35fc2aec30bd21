//! Batch configuration from flags, environment and config file

use anyhow::{bail, Context, Result};
use clap::Parser;
use soleil_batch::{default_workers, BatchOptions};
use soleil_config::AppConfig;
use std::env;

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Precompute horizon profiles for every venue")]
pub struct Args {
    /// Number of workers (default: CPU count - 1)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Save every N profiles
    #[arg(long)]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// PostGIS connection URL
    pub database_url: String,

    pub batch: BatchOptions,
}

impl DaemonConfig {
    /// Resolve settings: flags win over `DATABASE_URL`, which wins over the file
    pub fn resolve(args: &Args, file: &AppConfig) -> Result<Self> {
        Self::resolve_with(args, file, env::var("DATABASE_URL").ok())
    }

    fn resolve_with(args: &Args, file: &AppConfig, env_url: Option<String>) -> Result<Self> {
        let database_url = env_url
            .or_else(|| file.database_url())
            .context("DATABASE_URL environment variable not set and no [database] url configured")?;

        let workers = args
            .workers
            .or_else(|| file.batch_workers())
            .unwrap_or_else(default_workers);
        let batch_size = args.batch_size.unwrap_or_else(|| file.batch_size());

        if workers == 0 {
            bail!("Invalid worker count: 0");
        }
        if batch_size == 0 {
            bail!("Invalid batch size: 0");
        }

        Ok(Self {
            database_url,
            batch: BatchOptions {
                workers,
                batch_size,
                progress_every: file.progress_every(),
                search_radius_m: file.search_radius_m(),
            },
        })
    }
}
