//! Switch loop: the operating mode state machine.
//!
//! # States
//! - Auto: each measurement goes through the decider
//! - Main / Reserve: path pinned, measurements ignored
//!
//! # State Transitions
//! ```text
//! any → Auto:          latches reset, main promoted
//! any → Main/Reserve:  corresponding path promoted once
//! ```
//!
//! A mode counts as entered only once its promotion succeeded; until then
//! every wakeup retries the entry and measurements are not acted upon.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};

use crate::config::store::ModeState;
use crate::config::{ConfigStore, InterfacesConfig, Mode};
use crate::controller::Cycle;
use crate::health::{decide, HysteresisState, Measurement};
use crate::observability::metrics;
use crate::switcher::{Path, PathSwitcher};

pub(crate) struct SwitchLoop {
    store: Arc<ConfigStore>,
    switcher: Arc<dyn PathSwitcher>,
    interfaces: InterfacesConfig,
    applied: Option<ModeState>,
    latches: HysteresisState,
}

impl SwitchLoop {
    pub(crate) fn new(
        store: Arc<ConfigStore>,
        switcher: Arc<dyn PathSwitcher>,
        interfaces: InterfacesConfig,
    ) -> Self {
        Self {
            store,
            switcher,
            interfaces,
            applied: None,
            latches: HysteresisState::default(),
        }
    }

    pub(crate) async fn run(
        mut self,
        mut cycles: mpsc::Receiver<Cycle>,
        mut mode_rx: watch::Receiver<ModeState>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        self.sync_mode().await;

        loop {
            tokio::select! {
                changed = mode_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.sync_mode().await;
                }
                cycle = cycles.recv() => {
                    let Some(cycle) = cycle else {
                        break;
                    };
                    self.sync_mode().await;
                    self.on_measurement(&cycle.measurement).await;
                    let _ = cycle.done.send(());
                }
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!("Switch loop stopped");
    }

    /// Enter the stored mode unless that exact mode change was already entered.
    async fn sync_mode(&mut self) {
        let state = self.store.mode_state();
        if self.applied == Some(state) {
            return;
        }

        tracing::info!(
            from = ?self.applied.map(|s| s.mode),
            to = %state.mode,
            epoch = state.epoch,
            "Entering network switch mode"
        );

        let path = match state.mode {
            Mode::Auto => {
                self.latches = HysteresisState::default();
                Path::Main
            }
            Mode::Main => Path::Main,
            Mode::Reserve => Path::Reserve,
        };

        if self.promote(path).await {
            metrics::record_mode(state.mode);
            self.applied = Some(state);
        } else {
            tracing::warn!(mode = %state.mode, "Mode entry incomplete, retrying on next cycle");
        }
    }

    /// The current mode is auto and its entry completed.
    fn in_auto(&self) -> bool {
        matches!(self.applied, Some(state) if state.mode == Mode::Auto && state == self.store.mode_state())
    }

    async fn on_measurement(&mut self, measurement: &Measurement) {
        if !self.in_auto() {
            tracing::trace!(mode = ?self.applied.map(|s| s.mode), "Measurement not acted upon");
            return;
        }

        let thresholds = self.store.thresholds();
        let (next, transition) = decide(measurement, &thresholds, self.latches, self.switcher.active());

        let Some(path) = transition.target() else {
            self.latches = next;
            return;
        };

        tracing::info!(
            path = %path,
            rtt_ms = measurement.rtt_ms,
            rtt_threshold_ms = thresholds.rtt_ms,
            loss = measurement.packet_loss_percent,
            loss_threshold = thresholds.packet_loss_percent,
            "Threshold crossed, switching path"
        );

        // A failed switch keeps the old latches so the next cycle retries.
        if self.promote(path).await {
            self.latches = next;
        }
    }

    async fn promote(&self, path: Path) -> bool {
        match self.switcher.promote(path).await {
            Ok(()) => {
                let interface = path.interface(&self.interfaces);
                self.store.record_active(path, interface);
                metrics::record_switch(path, true);
                tracing::info!(path = %path, interface = %interface, "Path active");
                true
            }
            Err(e) => {
                metrics::record_switch(path, false);
                tracing::error!(path = %path, error = %e, "Failed to switch path");
                false
            }
        }
    }
}
