//! Configuration schema definitions.
//!
//! This module defines the daemon configuration loaded from the optional
//! TOML file. Runtime tunables (thresholds, probe parameters, mode) live in
//! [`crate::config::settings::Settings`] instead, since they change at runtime.

use serde::{Deserialize, Serialize};

use crate::config::settings::TuningUpdate;

/// Root configuration for the failover daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SwitcherConfig {
    /// Control API listener.
    pub api: ApiConfig,

    /// Physical interfaces and their routing metrics.
    pub interfaces: InterfacesConfig,

    /// Health probe settings.
    pub probe: ProbeConfig,

    /// Path switching mechanism.
    pub switch: SwitchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Optional threshold/probe overrides, re-applied on file change.
    pub tuning: Option<TuningUpdate>,
}

/// Control API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Bearer token required on every route when set.
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            api_key: None,
            request_timeout_secs: 10,
        }
    }
}

/// The two network attachments and the metrics used to order them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InterfacesConfig {
    /// Primary interface name.
    pub main: String,

    /// Reserve interface name.
    pub reserve: String,

    /// Metric given to the primary interface while it carries traffic.
    pub preferred_metric: u32,

    /// Metric given to the primary interface while the reserve carries traffic.
    /// Must be above the reserve interface's own metric.
    pub demoted_metric: u32,
}

impl Default for InterfacesConfig {
    fn default() -> Self {
        Self {
            main: "eth0".to_string(),
            reserve: "eth1".to_string(),
            preferred_metric: 100,
            demoted_metric: 102,
        }
    }
}

/// Which interface the monitor loop measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProbeTarget {
    /// Always the primary interface.
    #[default]
    Primary,
    /// Whichever interface is currently recorded as active.
    Active,
}

/// Health probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Ping executable.
    pub command: String,

    /// Host pinged on every round.
    pub target_host: String,

    /// Interface selection policy.
    pub target: ProbeTarget,

    /// Added to `count * interval` to bound a single round.
    pub round_timeout_grace_ms: u64,

    /// Optional `host:port` checked with a TCP connect before each measurement.
    pub reachability_address: Option<String>,

    /// Connect timeout for the reachability check.
    pub reachability_timeout_ms: u64,

    /// Pause between two measurements.
    pub cycle_pause_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            command: "ping".to_string(),
            target_host: "8.8.8.8".to_string(),
            target: ProbeTarget::Primary,
            round_timeout_grace_ms: 3000,
            reachability_address: None,
            reachability_timeout_ms: 2000,
            cycle_pause_ms: 500,
        }
    }
}

/// Path switching configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SwitchConfig {
    /// Executable invoked as `<command> <interface> <metric>`.
    pub command: String,

    /// Timeout for one invocation.
    pub timeout_ms: u64,

    /// Refuse to switch when the primary interface is absent from sysfs.
    pub verify_interface: bool,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            command: "ifmetric".to_string(),
            timeout_ms: 5000,
            verify_interface: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
