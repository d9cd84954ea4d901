//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define failover metrics (latency, loss, switches, mode changes)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `netswitch_rtt_ms` (gauge): last measured round-trip time
//! - `netswitch_packet_loss_percent` (gauge): last measured packet loss
//! - `netswitch_active_path` (gauge): 0=main, 1=reserve
//! - `netswitch_probe_round_failures_total` (counter)
//! - `netswitch_switches_total` (counter): by path, outcome
//! - `netswitch_mode_changes_total` (counter): by mode
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::config::Mode;
use crate::health::Measurement;
use crate::switcher::Path;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    ::metrics::describe_gauge!("netswitch_rtt_ms", "Last measured round-trip time in milliseconds");
    ::metrics::describe_gauge!("netswitch_packet_loss_percent", "Last measured packet loss");
    ::metrics::describe_gauge!("netswitch_active_path", "Active path (0=main, 1=reserve)");
    ::metrics::describe_counter!("netswitch_probe_round_failures_total", "Probe rounds that produced no result");
    ::metrics::describe_counter!("netswitch_switches_total", "Path promotions by outcome");
    ::metrics::describe_counter!("netswitch_mode_changes_total", "Operating mode entries");

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_measurement(measurement: &Measurement) {
    ::metrics::gauge!("netswitch_rtt_ms").set(measurement.rtt_ms);
    ::metrics::gauge!("netswitch_packet_loss_percent").set(measurement.packet_loss_percent);
}

pub fn record_probe_round_failure() {
    ::metrics::counter!("netswitch_probe_round_failures_total").increment(1);
}

pub fn record_switch(path: Path, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!("netswitch_switches_total", "path" => path.as_str(), "outcome" => outcome).increment(1);

    if success {
        let value = match path {
            Path::Main => 0.0,
            Path::Reserve => 1.0,
        };
        ::metrics::gauge!("netswitch_active_path").set(value);
    }
}

pub fn record_mode(mode: Mode) {
    ::metrics::counter!("netswitch_mode_changes_total", "mode" => mode.as_str()).increment(1);
}
