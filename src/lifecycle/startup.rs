//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start background tasks (config watcher, failover controller)
//! - Bind the control API and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The API listens last, after the controller is running

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::validation::describe;
use crate::config::watcher::ConfigWatcher;
use crate::config::{ConfigStore, Settings, SwitcherConfig};
use crate::controller::FailoverController;
use crate::health::{HealthProbe, PingProber};
use crate::http::HttpServer;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::lifecycle::Shutdown;
use crate::observability::metrics::init_metrics;
use crate::switcher::IfmetricSwitcher;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind control API on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid metrics address {0}")]
    MetricsAddress(String),
    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),
    #[error("control API failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the daemon until SIGINT or SIGTERM.
pub async fn run(
    config: SwitcherConfig,
    config_path: Option<PathBuf>,
    settings: Settings,
) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        init_metrics(addr)?;
    }

    let store = Arc::new(ConfigStore::new(settings));
    if let Some(tuning) = &config.tuning {
        // The file overrides the environment defaults.
        if let Err(errors) = store.apply_tuning(tuning) {
            tracing::warn!(reason = %describe(&errors), "Ignoring [tuning] from config file");
        }
    }

    let _watcher = match &config_path {
        Some(path) => Some(ConfigWatcher::new(path, store.clone()).run()?),
        None => None,
    };

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let prober = Arc::new(PingProber::new(&config.probe));
    let probe = HealthProbe::new(prober, &config.probe);
    let switcher = Arc::new(IfmetricSwitcher::new(&config.switch, config.interfaces.clone()));
    let controller = FailoverController::new(
        store.clone(),
        probe,
        switcher,
        config.interfaces.clone(),
        config.probe.clone(),
    )
    .spawn(&shutdown);

    let listener = TcpListener::bind(&config.api.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.api.bind_address.clone(),
            source,
        })?;

    let server = HttpServer::new(store, &config.api);
    let served = server.run(listener, shutdown.subscribe()).await;

    // The server also returns on its own errors; make sure the loops stop.
    shutdown.trigger();
    controller.join().await;

    served.map_err(StartupError::Serve)?;
    tracing::info!("Shutdown complete");
    Ok(())
}
