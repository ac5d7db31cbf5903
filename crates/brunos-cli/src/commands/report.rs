//! Report command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use brunos_core::{NoopNotifier, OrderService};
use clap::Args;

#[derive(Args)]
pub struct ReportArgs {
    /// Path to a brunos.toml config file
    #[arg(short, long, env = "BRUNOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Redis URL to read orders from
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,
}

pub async fn execute(args: ReportArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(url) = args.redis_url {
        config.store.redis_url = Some(url);
    }

    let store = super::open_store(&config).await?;
    let service = OrderService::new(store, Arc::new(NoopNotifier));
    print!("{}", service.generate_report().await?);
    Ok(())
}
