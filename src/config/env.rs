//! Startup defaults from the process environment.
//!
//! Every variable in [`REQUIRED_VARS`] must be present and valid. A partial set
//! of defaults is never accepted.

use thiserror::Error;

use crate::config::settings::{Mode, Settings, TuningUpdate};
use crate::config::validation::{describe, validate_tuning, ValidationError};

pub const RTT_SETTINGS: &str = "RTT_SETTINGS";
pub const PACKET_LOSS_SETTINGS: &str = "PACKET_LOSS_SETTINGS";
pub const PINGER_COUNT: &str = "PINGER_COUNT";
pub const PINGER_INTERVAL: &str = "PINGER_INTERVAL";
pub const NETWORK_SWITCH_MODE: &str = "NETWORK_SWITCH_MODE";
pub const PING_BLOCKS_NUM: &str = "PING_BLOCKS_NUM";

pub const REQUIRED_VARS: [&str; 6] = [
    RTT_SETTINGS,
    PACKET_LOSS_SETTINGS,
    PINGER_COUNT,
    PINGER_INTERVAL,
    NETWORK_SWITCH_MODE,
    PING_BLOCKS_NUM,
];

/// A required startup default is missing or unusable.
#[derive(Debug, Error)]
pub enum StartupConfigError {
    #[error("required environment variables not set: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("environment variable {var}={value:?} is not a valid number")]
    NotANumber { var: &'static str, value: String },

    #[error("invalid startup defaults: {}", describe(.0))]
    Invalid(Vec<ValidationError>),
}

/// Build the initial settings from the process environment.
pub fn settings_from_env(interface: &str) -> Result<Settings, StartupConfigError> {
    settings_from_lookup(|var| std::env::var(var).ok(), interface)
}

/// Build the initial settings from an arbitrary variable lookup.
pub fn settings_from_lookup<F>(lookup: F, interface: &str) -> Result<Settings, StartupConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let missing: Vec<&'static str> = REQUIRED_VARS
        .iter()
        .copied()
        .filter(|&var| lookup(var).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(StartupConfigError::Missing(missing));
    }

    let read = |var: &'static str| lookup(var).unwrap_or_default().trim().to_string();

    let float = |var: &'static str| {
        let value = read(var);
        value
            .parse::<f64>()
            .map_err(|_| StartupConfigError::NotANumber { var, value })
    };
    let int = |var: &'static str| {
        let value = read(var);
        value
            .parse::<i64>()
            .map_err(|_| StartupConfigError::NotANumber { var, value })
    };

    let update = TuningUpdate {
        rtt_settings_ms: float(RTT_SETTINGS)?,
        packet_loss_percent: float(PACKET_LOSS_SETTINGS)?,
        pinger_count: int(PINGER_COUNT)?,
        pinger_interval_ms: int(PINGER_INTERVAL)?,
        ping_blocks_num: int(PING_BLOCKS_NUM)?,
    };

    let mode: Result<Mode, _> = read(NETWORK_SWITCH_MODE).parse();
    let tuning = validate_tuning(&update);

    let (tuning, mode) = match (tuning, mode) {
        (Ok(tuning), Ok(mode)) => (tuning, mode),
        (tuning, mode) => {
            let mut errors = tuning.err().unwrap_or_default();
            errors.extend(mode.err());
            return Err(StartupConfigError::Invalid(errors));
        }
    };

    tracing::info!(
        rtt_threshold_ms = tuning.rtt_threshold_ms,
        packet_loss_threshold_percent = tuning.packet_loss_threshold_percent,
        probe_count = tuning.probe_count,
        probe_interval_ms = tuning.probe_interval_ms,
        probe_rounds = tuning.probe_rounds,
        mode = %mode,
        "Startup defaults loaded from environment"
    );

    Ok(tuning.into_settings(mode, interface))
}
