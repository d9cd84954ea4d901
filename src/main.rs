//! netswitch: primary/reserve uplink failover daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │                          NETSWITCH                           │
//!  │                                                              │
//!  │  ┌──────────┐  Measurement  ┌─────────────┐  promote(path)   │
//!  │  │ monitor  │──── slot ────▶│ switch loop │─────────────────▶│── ifmetric
//!  │  │  loop    │◀─── ack ──────│  (decider)  │                  │
//!  │  └────┬─────┘               └──────▲──────┘                  │
//!  │       │ ping rounds               │ mode (watch)             │
//!  │       ▼                           │                          │
//!  │   interface              ┌────────┴───────┐                  │
//!  │                          │  ConfigStore   │◀── control API ──│── operator
//!  │                          │   (Settings)   │◀── [tuning] file │
//!  │                          └────────────────┘                  │
//!  │                                                              │
//!  │  Cross-cutting: config, observability, resilience, lifecycle │
//!  └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use netswitch::config::env::settings_from_env;
use netswitch::config::loader::load_config;
use netswitch::lifecycle::startup;
use netswitch::observability::logging::init_logging;
use netswitch::SwitcherConfig;

#[derive(Parser)]
#[command(name = "netswitch")]
#[command(about = "Primary/reserve uplink failover daemon", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long, env = "NETSWITCH_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SwitcherConfig::default(),
    };

    init_logging(&config.observability);
    tracing::info!("netswitch v{} starting", env!("CARGO_PKG_VERSION"));

    let settings = match settings_from_env(&config.interfaces.main) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start without startup defaults");
            return Err(e.into());
        }
    };

    tracing::info!(
        bind_address = %config.api.bind_address,
        main = %config.interfaces.main,
        reserve = %config.interfaces.reserve,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    startup::run(config, cli.config, settings).await?;
    Ok(())
}
