//! Runtime settings shared between the control API and the controller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::validation::ValidationError;
use crate::switcher::Path;

/// Operating mode of the failover controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Probe results decide the active path.
    Auto,
    /// Primary path pinned.
    Main,
    /// Reserve path pinned.
    Reserve,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Auto => "auto",
            Mode::Main => "main",
            Mode::Reserve => "reserve",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Mode::Auto),
            "main" => Ok(Mode::Main),
            "reserve" => Ok(Mode::Reserve),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// Trip points fed to the hysteresis decider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub rtt_ms: f64,
    pub packet_loss_percent: f64,
}

/// Parameters of one measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeParams {
    /// Packets per round.
    pub count: u32,
    /// Spacing between packets.
    pub interval_ms: u64,
    /// Rounds averaged into one measurement.
    pub rounds: u32,
}

/// Threshold and probe parameter update, as accepted by `POST /configure`.
///
/// Counts are signed so that negative input reaches validation and is
/// reported as a violated constraint instead of a decoding error.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TuningUpdate {
    pub rtt_settings_ms: f64,
    pub packet_loss_percent: f64,
    pub pinger_count: i64,
    pub pinger_interval_ms: i64,
    pub ping_blocks_num: i64,
}

/// Mode update, as accepted by `POST /set_network_mode`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModeUpdate {
    pub network_switch_mode: String,
}

/// The single shared settings instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    #[serde(rename = "rtt_settings")]
    pub rtt_threshold_ms: f64,

    #[serde(rename = "packet_loss_settings_percent")]
    pub packet_loss_threshold_percent: f64,

    #[serde(rename = "pinger_count")]
    pub probe_count: u32,

    #[serde(rename = "pinger_interval_ms")]
    pub probe_interval_ms: u64,

    #[serde(rename = "ping_blocks_num")]
    pub probe_rounds: u32,

    #[serde(rename = "network_switch_mode")]
    pub mode: Mode,

    #[serde(rename = "current_interface")]
    pub active_interface: String,

    pub active_path: Option<Path>,

    /// Most recent measured RTT.
    pub rtt_ms: f64,

    /// Most recent measured loss.
    pub packet_loss_percent: f64,

    /// Whether the last measurement over the main path got any reply.
    pub alive_main_network: bool,

    /// Whether the last measurement over the reserve path got any reply.
    pub alive_reserve_network: bool,

    /// Failed rounds in the most recent measurement.
    pub failed_rounds: u32,
}

impl Settings {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            rtt_ms: self.rtt_threshold_ms,
            packet_loss_percent: self.packet_loss_threshold_percent,
        }
    }

    pub fn probe_params(&self) -> ProbeParams {
        ProbeParams {
            count: self.probe_count,
            interval_ms: self.probe_interval_ms,
            rounds: self.probe_rounds,
        }
    }

    /// Overwrite thresholds and probe parameters from an already validated update.
    pub(crate) fn apply(&mut self, tuning: &ValidTuning) {
        self.rtt_threshold_ms = tuning.rtt_threshold_ms;
        self.packet_loss_threshold_percent = tuning.packet_loss_threshold_percent;
        self.probe_count = tuning.probe_count;
        self.probe_interval_ms = tuning.probe_interval_ms;
        self.probe_rounds = tuning.probe_rounds;
    }
}

/// A [`TuningUpdate`] that passed validation, converted to the settings' types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidTuning {
    pub rtt_threshold_ms: f64,
    pub packet_loss_threshold_percent: f64,
    pub probe_count: u32,
    pub probe_interval_ms: u64,
    pub probe_rounds: u32,
}

impl ValidTuning {
    /// Build the initial settings from validated defaults.
    pub fn into_settings(self, mode: Mode, interface: &str) -> Settings {
        Settings {
            rtt_threshold_ms: self.rtt_threshold_ms,
            packet_loss_threshold_percent: self.packet_loss_threshold_percent,
            probe_count: self.probe_count,
            probe_interval_ms: self.probe_interval_ms,
            probe_rounds: self.probe_rounds,
            mode,
            active_interface: interface.to_string(),
            active_path: None,
            rtt_ms: 0.0,
            packet_loss_percent: 0.0,
            alive_main_network: false,
            alive_reserve_network: false,
            failed_rounds: 0,
        }
    }
}
