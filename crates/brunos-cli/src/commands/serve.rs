//! Web server command.

use std::path::PathBuf;

use anyhow::Result;
use brunos_core::Config;
use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct ServeArgs {
    /// Path to a brunos.toml config file
    #[arg(short, long, env = "BRUNOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, env = "BRUNOS_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "BRUNOS_PORT")]
    pub port: Option<u16>,

    /// Redis URL; orders stay in memory when unset
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Directory for the uploaded menu image
    #[arg(long, env = "BRUNOS_UPLOAD_DIR")]
    pub upload_dir: Option<String>,

    /// Delay in milliseconds before a new display gets the order list
    #[arg(long, env = "BRUNOS_SYNC_DELAY_MS")]
    pub sync_delay_ms: Option<u64>,

    /// Identify displays by X-Forwarded-For (only behind a trusted proxy)
    #[arg(long, env = "BRUNOS_TRUST_FORWARDED_FOR")]
    pub trust_forwarded_for: bool,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file used with --log
    #[arg(long, default_value = "logs/brunos.log")]
    pub log_file: PathBuf,
}

impl ServeArgs {
    /// Apply command-line and environment overrides on top of `config`.
    fn apply(&self, mut config: Config) -> Result<Config> {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.redis_url {
            config.store.redis_url = Some(url.clone());
        }
        if let Some(dir) = &self.upload_dir {
            config.server.upload_dir = dir.clone();
        }
        if let Some(delay) = self.sync_delay_ms {
            config.hub.initial_sync_delay_ms = delay;
        }
        if self.trust_forwarded_for {
            config.server.trust_forwarded_for = true;
        }
        config.validate()?;
        Ok(config)
    }
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = args.apply(super::load_config(args.config.as_deref())?)?;
    let store = super::open_store(&config).await?;

    let host = &config.server.host;
    let port = config.server.port;
    println!();
    println!("  {} {}", "Bruno's".cyan().bold(), "Order Board".bold());
    println!();
    println!("  {}        http://{}:{}/api/order", "API".green(), host, port);
    println!("  {}       http://{}:{}/api/menu/image", "Menu".green(), host, port);
    println!("  {}  ws://{}:{}/ws", "Displays".green(), host, port);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    brunos_web::run_server(store, config).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    #[test]
    fn test_flags_override_config() {
        let cli = TestCli::parse_from(["brunos", "--port", "8081", "--sync-delay-ms", "1500"]);
        let mut base = Config::default();
        base.server.host = "0.0.0.0".to_string();

        let config = cli.serve.apply(base).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.hub.initial_sync_delay_ms, 1500);
        assert!(!config.server.trust_forwarded_for);
    }

    #[test]
    fn test_trust_forwarded_for_is_opt_in() {
        let cli = TestCli::parse_from(["brunos", "--trust-forwarded-for"]);
        let config = cli.serve.apply(Config::default()).unwrap();
        assert!(config.server.trust_forwarded_for);
    }
}
