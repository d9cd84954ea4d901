//! Monitor loop: measure, publish, hand off, wait.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time;

use crate::config::{ConfigStore, ProbeTarget};
use crate::controller::Cycle;
use crate::health::HealthProbe;
use crate::observability::metrics;
use crate::switcher::Path;

pub(super) struct MonitorLoop {
    pub(super) store: Arc<ConfigStore>,
    pub(super) probe: HealthProbe,
    pub(super) target: ProbeTarget,
    pub(super) main_interface: String,
    pub(super) pause: Duration,
}

impl MonitorLoop {
    fn probe_target(&self) -> (Path, String) {
        match self.target {
            ProbeTarget::Primary => (Path::Main, self.main_interface.clone()),
            ProbeTarget::Active => self.store.active(),
        }
    }

    pub(super) async fn run(self, tx: mpsc::Sender<Cycle>, mut shutdown: broadcast::Receiver<()>) {
        tracing::debug!(pause = ?self.pause, "Monitor loop started");

        loop {
            let (path, interface) = self.probe_target();
            let params = self.store.probe_params();

            let measurement = tokio::select! {
                m = self.probe.measure(&interface, &params) => m,
                _ = shutdown.recv() => break,
            };

            self.store.record_measurement(path, &measurement);
            metrics::record_measurement(&measurement);
            tracing::debug!(
                interface = %interface,
                rtt_ms = measurement.rtt_ms,
                loss = measurement.packet_loss_percent,
                failed_rounds = measurement.failed_rounds,
                "Measurement complete"
            );

            let (done, decided) = oneshot::channel();
            let handed_off = tokio::select! {
                sent = tx.send(Cycle { measurement, done }) => sent.is_ok(),
                _ = shutdown.recv() => break,
            };
            if !handed_off {
                tracing::warn!("Switch loop gone, stopping monitor");
                break;
            }

            // Next measurement only after the previous one was acted upon.
            tokio::select! {
                ack = decided => {
                    if ack.is_err() {
                        break;
                    }
                }
                _ = shutdown.recv() => break,
            }

            if !self.pause.is_zero() {
                tokio::select! {
                    _ = time::sleep(self.pause) => {}
                    _ = shutdown.recv() => break,
                }
            }
        }

        tracing::info!("Monitor loop stopped");
    }
}
