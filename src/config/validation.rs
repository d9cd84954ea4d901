//! Configuration validation.
//!
//! # Responsibilities
//! - Range checks for thresholds and probe parameters before they reach `Settings`
//! - Semantic checks of the daemon config file
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over the decoded input
//! - Runs before anything is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::SwitcherConfig;
use crate::config::settings::{TuningUpdate, ValidTuning};

pub const MIN_PROBE_INTERVAL_MS: i64 = 20;

/// A rejected configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be {constraint}, got {value}")]
    OutOfRange {
        field: &'static str,
        constraint: &'static str,
        value: String,
    },

    #[error("unknown network switch mode {0:?}, expected one of main, auto, reserve")]
    UnknownMode(String),

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn out_of_range(field: &'static str, constraint: &'static str, value: impl ToString) -> ValidationError {
    ValidationError::OutOfRange {
        field,
        constraint,
        value: value.to_string(),
    }
}

/// Check a threshold update against the settings invariants.
pub fn validate_tuning(update: &TuningUpdate) -> Result<ValidTuning, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let rtt = update.rtt_settings_ms;
    if !rtt.is_finite() || rtt < 0.0 {
        errors.push(out_of_range("rtt_settings_ms", ">= 0", rtt));
    }

    let loss = update.packet_loss_percent;
    if !loss.is_finite() || !(0.0..=100.0).contains(&loss) {
        errors.push(out_of_range("packet_loss_percent", "between 0 and 100", loss));
    }

    let count = u32::try_from(update.pinger_count).ok().filter(|c| *c >= 1);
    if count.is_none() {
        errors.push(out_of_range("pinger_count", ">= 1", update.pinger_count));
    }

    let interval = u64::try_from(update.pinger_interval_ms)
        .ok()
        .filter(|_| update.pinger_interval_ms >= MIN_PROBE_INTERVAL_MS);
    if interval.is_none() {
        errors.push(out_of_range("pinger_interval_ms", ">= 20", update.pinger_interval_ms));
    }

    let rounds = u32::try_from(update.ping_blocks_num).ok().filter(|r| *r >= 1);
    if rounds.is_none() {
        errors.push(out_of_range("ping_blocks_num", ">= 1", update.ping_blocks_num));
    }

    match (count, interval, rounds) {
        (Some(probe_count), Some(probe_interval_ms), Some(probe_rounds)) if errors.is_empty() => {
            Ok(ValidTuning {
                rtt_threshold_ms: rtt,
                packet_loss_threshold_percent: loss,
                probe_count,
                probe_interval_ms,
                probe_rounds,
            })
        }
        _ => Err(errors),
    }
}

/// Semantic checks on the daemon configuration file.
pub fn validate_config(config: &SwitcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.api.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Invalid {
            field: "api.bind_address",
            reason: format!("{:?} is not a socket address", config.api.bind_address),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Invalid {
            field: "observability.metrics_address",
            reason: format!("{:?} is not a socket address", config.observability.metrics_address),
        });
    }

    let ifaces = &config.interfaces;
    if ifaces.main.trim().is_empty() || ifaces.reserve.trim().is_empty() {
        errors.push(ValidationError::Invalid {
            field: "interfaces",
            reason: "interface names must not be empty".to_string(),
        });
    } else if ifaces.main == ifaces.reserve {
        errors.push(ValidationError::Invalid {
            field: "interfaces",
            reason: format!("main and reserve are both {:?}", ifaces.main),
        });
    }

    if ifaces.preferred_metric >= ifaces.demoted_metric {
        errors.push(ValidationError::Invalid {
            field: "interfaces.demoted_metric",
            reason: format!(
                "must be greater than preferred_metric ({} >= {})",
                ifaces.preferred_metric, ifaces.demoted_metric
            ),
        });
    }

    if config.probe.target_host.trim().is_empty() {
        errors.push(ValidationError::Invalid {
            field: "probe.target_host",
            reason: "must not be empty".to_string(),
        });
    }

    if config.switch.timeout_ms == 0 {
        errors.push(out_of_range("switch.timeout_ms", "> 0", 0));
    }

    if let Some(tuning) = &config.tuning {
        if let Err(mut tuning_errors) = validate_tuning(tuning) {
            errors.append(&mut tuning_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Render violations as a single rejection reason.
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update() -> TuningUpdate {
        TuningUpdate {
            rtt_settings_ms: 100.0,
            packet_loss_percent: 5.0,
            pinger_count: 10,
            pinger_interval_ms: 200,
            ping_blocks_num: 3,
        }
    }

    #[test]
    fn test_valid_update() {
        let valid = validate_tuning(&update()).unwrap();
        assert_eq!(valid.probe_count, 10);
        assert_eq!(valid.probe_interval_ms, 200);
        assert_eq!(valid.probe_rounds, 3);
    }

    #[test]
    fn test_interval_below_minimum() {
        let errors = validate_tuning(&TuningUpdate {
            pinger_interval_ms: 5,
            ..update()
        })
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(describe(&errors).contains("pinger_interval_ms must be >= 20, got 5"));
    }

    #[test]
    fn test_boundaries_accepted() {
        let valid = validate_tuning(&TuningUpdate {
            rtt_settings_ms: 0.0,
            packet_loss_percent: 100.0,
            pinger_count: 1,
            pinger_interval_ms: 20,
            ping_blocks_num: 1,
        });
        assert!(valid.is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let errors = validate_tuning(&TuningUpdate {
            rtt_settings_ms: -1.0,
            packet_loss_percent: 101.0,
            pinger_count: 0,
            pinger_interval_ms: -20,
            ping_blocks_num: 0,
        })
        .unwrap_err();
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_nan_rejected() {
        let errors = validate_tuning(&TuningUpdate {
            rtt_settings_ms: f64::NAN,
            ..update()
        })
        .unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SwitcherConfig::default()).is_ok());
    }

    #[test]
    fn test_config_rejects_same_interfaces_and_metric_order() {
        let mut config = SwitcherConfig::default();
        config.interfaces.reserve = config.interfaces.main.clone();
        config.interfaces.demoted_metric = config.interfaces.preferred_metric;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
