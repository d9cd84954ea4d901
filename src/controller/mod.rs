//! Failover controller.
//!
//! # Data Flow
//! ```text
//! monitor.rs (task 1)                      switch_loop.rs (task 2)
//!     probe params from store
//!     → HealthProbe::measure
//!     → store.record_measurement
//!     → send Cycle ───── slot (1) ─────▶   mode check
//!                                          → Auto: decide → PathSwitcher
//!     ◀──────────── ack (oneshot) ──────   → record active path
//!     → pause, next cycle
//!
//! store.set_mode ──── watch ────────────▶  enter mode immediately
//! ```
//!
//! # Design Decisions
//! - The monitor never measures again before the previous cycle was decided
//! - Forced modes keep probing for observability but never drive the switcher
//! - Probe and switch errors stop at this layer; both loops run until shutdown

mod monitor;
mod switch_loop;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::{ConfigStore, InterfacesConfig, ProbeConfig};
use crate::health::{HealthProbe, Measurement};
use crate::lifecycle::Shutdown;
use crate::switcher::PathSwitcher;

use self::monitor::MonitorLoop;
use self::switch_loop::SwitchLoop;

/// One completed measurement handed from the monitor to the switch loop.
struct Cycle {
    measurement: Measurement,
    done: oneshot::Sender<()>,
}

pub struct FailoverController {
    store: Arc<ConfigStore>,
    probe: HealthProbe,
    switcher: Arc<dyn PathSwitcher>,
    interfaces: InterfacesConfig,
    probe_config: ProbeConfig,
}

impl FailoverController {
    pub fn new(
        store: Arc<ConfigStore>,
        probe: HealthProbe,
        switcher: Arc<dyn PathSwitcher>,
        interfaces: InterfacesConfig,
        probe_config: ProbeConfig,
    ) -> Self {
        Self {
            store,
            probe,
            switcher,
            interfaces,
            probe_config,
        }
    }

    /// Start the monitor loop and the switch loop.
    pub fn spawn(self, shutdown: &Shutdown) -> ControllerHandle {
        let (tx, rx) = mpsc::channel(1);

        tracing::info!(
            main = %self.interfaces.main,
            reserve = %self.interfaces.reserve,
            target = ?self.probe_config.target,
            mode = %self.store.mode(),
            "Failover controller starting"
        );

        let monitor = MonitorLoop {
            store: self.store.clone(),
            probe: self.probe,
            target: self.probe_config.target,
            main_interface: self.interfaces.main.clone(),
            pause: Duration::from_millis(self.probe_config.cycle_pause_ms),
        };
        let switch = SwitchLoop::new(self.store.clone(), self.switcher, self.interfaces);

        let mode_rx = self.store.subscribe_mode();
        let switch = tokio::spawn(switch.run(rx, mode_rx, shutdown.subscribe()));
        let monitor = tokio::spawn(monitor.run(tx, shutdown.subscribe()));

        ControllerHandle { monitor, switch }
    }
}

pub struct ControllerHandle {
    monitor: JoinHandle<()>,
    switch: JoinHandle<()>,
}

impl ControllerHandle {
    /// Wait for both loops to exit after shutdown was triggered.
    pub async fn join(self) {
        let (monitor, switch) = tokio::join!(self.monitor, self.switch);
        if let Err(e) = monitor {
            tracing::error!(error = %e, "Monitor loop terminated abnormally");
        }
        if let Err(e) = switch {
            tracing::error!(error = %e, "Switch loop terminated abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.monitor.is_finished() && self.switch.is_finished()
    }
}
