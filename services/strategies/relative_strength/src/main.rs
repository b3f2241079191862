//! Relative Strength Service Main Entry Point
//!
//! Usage:
//!   relative_strength --market-data data/market.json
//!   relative_strength --config config/strengthscan.toml --market-data data/market.json --once
//!   relative_strength --print-default-config > config/strengthscan.toml

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use relative_strength::logging::init_logging;
use relative_strength::{JsonFileSource, JsonlFileSink, LogSink, RelativeStrengthService};
use strengthscan_config::{resolve_config_path, EngineConfig};
use strengthscan_strategy_shared::{SignalSink, Strategy};

#[derive(Parser, Debug)]
#[command(name = "relative_strength")]
#[command(about = "StrengthScan relative strength engine")]
#[command(version)]
struct Args {
    /// Path to configuration file (falls back to STRENGTHSCAN_CONFIG_PATH)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON market data snapshot read at every cycle
    #[arg(short, long, required_unless_present = "print_default_config")]
    market_data: Option<PathBuf>,

    /// Append emitted signals to this JSON-lines file instead of logging them
    #[arg(long)]
    signals_out: Option<PathBuf>,

    /// Write the published snapshot as JSON here (with --once)
    #[arg(long)]
    snapshot_out: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Print the built-in configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", EngineConfig::default().to_toml_string()?);
        return Ok(());
    }

    let config_path = resolve_config_path(args.config.clone());
    let config = EngineConfig::load(config_path.as_deref())
        .context("Failed to load relative strength configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level, args.json_logs || config.logging.json)?;

    info!("Starting StrengthScan relative strength service");
    match &config_path {
        Some(path) => info!("Configuration: {:?}", path),
        None => info!("Configuration: built-in defaults"),
    }

    let settings = Arc::new(config.validate().context("Invalid configuration")?);
    info!(
        "Monitoring {} assets against {} on {} timeframes",
        settings.ranked_assets().count(),
        settings.benchmark,
        settings.timeframes.len()
    );

    let market_data = args
        .market_data
        .clone()
        .context("--market-data is required")?;
    let source = Arc::new(JsonFileSource::new(market_data));
    let sink: Arc<dyn SignalSink> = match &args.signals_out {
        Some(path) => Arc::new(JsonlFileSink::new(path)),
        None => Arc::new(LogSink),
    };

    let mut service = RelativeStrengthService::new(settings, source, sink);

    if args.once {
        service.run_once().await?;
        if let Some(path) = &args.snapshot_out {
            let json = service
                .store()
                .latest_json()?
                .context("No snapshot published")?;
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write snapshot to {:?}", path))?;
            info!("Snapshot written to {:?}", path);
        }
        return Ok(());
    }

    let shutdown = service.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
        shutdown.notify_one();
    });

    info!("Relative strength service running. Press Ctrl+C to stop.");
    service.start().await?;
    service.stop().await?;

    Ok(())
}
