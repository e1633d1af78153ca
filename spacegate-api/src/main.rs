use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use spacegate_api::{ApiServer, AppState};
use spacegate_core::config::Config;
use spacegate_core::logging::{init_logging_with_config, LogConfig};
use spacegate_core::metrics::init_metrics;
use spacegate_core::shutdown::{install_signal_handlers, ShutdownCoordinator};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "spacegate-api")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SPACEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// SQLite database file (":memory:" for a throwaway store)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env()?;

    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(database) = &args.database {
        config.store.database_path = database.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.to_lowercase();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    init_logging_with_config(LogConfig::try_from(&config.logging)?)?;
    init_metrics();

    info!(
        database = %config.store.database_path.display(),
        "SpaceGate API starting"
    );

    let shutdown = Arc::new(ShutdownCoordinator::new(config.server.shutdown_timeout));
    install_signal_handlers(shutdown.clone());

    let state = AppState::open(config)?;
    ApiServer::new(state, shutdown).run().await?;

    info!("SpaceGate API stopped");
    Ok(())
}
