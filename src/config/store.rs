//! Shared, synchronized settings store.
//!
//! One [`ConfigStore`] is created at startup and handed by `Arc` to the control
//! API and the failover controller. All access goes through a single mutex;
//! mode changes are additionally published on a watch channel so the switch
//! loop can react without waiting for the next measurement.
//!
//! Every actual mode change bumps an epoch. Several writes that land before
//! the switch loop wakes collapse into one watch value, but the epoch still
//! tells the loop that it has to re-enter the mode.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::config::settings::{Mode, ProbeParams, Settings, Thresholds, TuningUpdate, ValidTuning};
use crate::config::validation::{validate_tuning, ValidationError};
use crate::health::Measurement;
use crate::switcher::Path;

/// The operating mode tagged with the number of mode changes so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeState {
    pub epoch: u64,
    pub mode: Mode,
}

#[derive(Debug)]
pub struct ConfigStore {
    settings: Mutex<Settings>,
    mode_tx: watch::Sender<ModeState>,
}

impl ConfigStore {
    pub fn new(settings: Settings) -> Self {
        let (mode_tx, _) = watch::channel(ModeState {
            epoch: 0,
            mode: settings.mode,
        });
        Self {
            settings: Mutex::new(settings),
            mode_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Settings> {
        // Settings stay consistent across a panic: every write is a plain field store.
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.lock().clone()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.lock().thresholds()
    }

    pub fn probe_params(&self) -> ProbeParams {
        self.lock().probe_params()
    }

    pub fn mode(&self) -> Mode {
        self.lock().mode
    }

    /// Active path and interface; main until the first promotion.
    pub fn active(&self) -> (Path, String) {
        let settings = self.lock();
        (
            settings.active_path.unwrap_or(Path::Main),
            settings.active_interface.clone(),
        )
    }

    /// Validate and atomically apply new thresholds and probe parameters.
    ///
    /// On rejection the settings are left untouched.
    pub fn apply_tuning(&self, update: &TuningUpdate) -> Result<Settings, Vec<ValidationError>> {
        let tuning = validate_tuning(update)?;
        Ok(self.apply_valid(&tuning))
    }

    fn apply_valid(&self, tuning: &ValidTuning) -> Settings {
        let mut settings = self.lock();
        settings.apply(tuning);
        tracing::info!(
            rtt_threshold_ms = settings.rtt_threshold_ms,
            packet_loss_threshold_percent = settings.packet_loss_threshold_percent,
            probe_count = settings.probe_count,
            probe_interval_ms = settings.probe_interval_ms,
            probe_rounds = settings.probe_rounds,
            "Tuning updated"
        );
        settings.clone()
    }

    /// Current mode and its epoch.
    pub fn mode_state(&self) -> ModeState {
        *self.mode_tx.borrow()
    }

    /// Set the operating mode and notify the controller.
    ///
    /// Writing the mode that is already set changes nothing.
    pub fn set_mode(&self, mode: Mode) {
        let mut settings = self.lock();
        let previous = std::mem::replace(&mut settings.mode, mode);
        if previous == mode {
            tracing::debug!(mode = %mode, "Network switch mode unchanged");
            return;
        }

        tracing::info!(from = %previous, to = %mode, "Network switch mode changed");
        // Published under the settings lock so epochs follow write order.
        self.mode_tx.send_modify(|state| {
            state.epoch += 1;
            state.mode = mode;
        });
    }

    /// Receiver notified on every mode change.
    pub fn subscribe_mode(&self) -> watch::Receiver<ModeState> {
        self.mode_tx.subscribe()
    }

    /// Record which path carries traffic after a successful promotion.
    pub fn record_active(&self, path: Path, interface: &str) {
        let mut settings = self.lock();
        settings.active_path = Some(path);
        settings.active_interface = interface.to_string();
    }

    /// Expose the most recent measurement, taken over `path`.
    pub fn record_measurement(&self, path: Path, measurement: &Measurement) {
        let mut settings = self.lock();
        settings.rtt_ms = measurement.rtt_ms;
        settings.packet_loss_percent = measurement.packet_loss_percent;
        settings.failed_rounds = measurement.failed_rounds;
        match path {
            Path::Main => settings.alive_main_network = measurement.is_alive(),
            Path::Reserve => settings.alive_reserve_network = measurement.is_alive(),
        }
    }
}
