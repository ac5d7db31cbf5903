//! CLI command definitions and handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use brunos_core::{Config, MemoryOrderStore, OrderStore};
use brunos_redis::RedisOrderStore;
use clap::{Parser, Subcommand};

pub mod report;
pub mod serve;

/// Bruno's order board - orders in, kitchen displays out
#[derive(Parser)]
#[command(name = "brunos")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the order API and display WebSocket server
    Serve(serve::ServeArgs),

    /// Print the order report
    Report(report::ReportArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args).await,
            Commands::Report(args) => report::execute(args).await,
        }
    }
}

/// Load the config file if one was given, defaults otherwise.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Open the configured order store.
pub(crate) async fn open_store(config: &Config) -> Result<Arc<dyn OrderStore>> {
    match &config.store.redis_url {
        Some(url) => {
            let store = RedisOrderStore::connect(url)
                .await
                .with_context(|| format!("Failed to connect to Redis at {}", url))?;
            tracing::info!(redis_url = %url, "Using Redis order store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No Redis URL configured, orders are kept in memory only");
            Ok(Arc::new(MemoryOrderStore::new()))
        }
    }
}
