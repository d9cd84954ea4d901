//! Health probe: one measurement cycle over an interface.
//!
//! # Responsibilities
//! - Run `rounds` sequential rounds through a [`RoundProber`]
//! - Bound every round with a deadline
//! - Aggregate per-round loss and latency into a [`Measurement`]
//!
//! # Design Decisions
//! - A failed round counts as 100% loss and 0 ms, so hiccups bias toward failover
//! - The measurement itself never fails; round errors are logged and absorbed
//! - No retries beyond the configured number of rounds

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time;

use crate::config::{ProbeConfig, ProbeParams};
use crate::observability::metrics;
use crate::resilience::timeouts::CommandError;

/// Loss attributed to a round that produced no result.
pub const FAILED_ROUND_LOSS_PERCENT: f64 = 100.0;

/// Result of one round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundSample {
    pub packet_loss_percent: f64,
    /// Average round-trip time of the round.
    pub rtt_ms: f64,
}

/// Aggregated result of one measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub packet_loss_percent: f64,
    pub rtt_ms: f64,
    pub failed_rounds: u32,
}

impl Measurement {
    /// At least one echo came back.
    pub fn is_alive(&self) -> bool {
        self.packet_loss_percent < FAILED_ROUND_LOSS_PERCENT
    }
}

/// One round of measurement could not be obtained.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("probe exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("unparsable probe output: {0}")]
    Parse(String),

    #[error("{address} unreachable: {reason}")]
    Unreachable { address: String, reason: String },

    #[error("round timed out after {0:?}")]
    Timeout(Duration),
}

/// The mechanism that measures a single round.
#[async_trait]
pub trait RoundProber: Send + Sync {
    async fn round(&self, interface: &str, params: &ProbeParams) -> Result<RoundSample, ProbeError>;
}

/// Deadline for one round: the time the packets need plus a grace period.
pub fn round_deadline(params: &ProbeParams, grace: Duration) -> Duration {
    let sending = params.interval_ms.saturating_mul(u64::from(params.count));
    Duration::from_millis(sending) + grace
}

/// Drop everything below the hundredth.
pub fn truncate_hundredths(value: f64) -> f64 {
    (value * 100.0).trunc() / 100.0
}

#[derive(Debug, Clone)]
struct Reachability {
    address: String,
    timeout: Duration,
}

pub struct HealthProbe {
    prober: Arc<dyn RoundProber>,
    round_grace: Duration,
    reachability: Option<Reachability>,
}

impl HealthProbe {
    pub fn new(prober: Arc<dyn RoundProber>, config: &ProbeConfig) -> Self {
        Self {
            prober,
            round_grace: Duration::from_millis(config.round_timeout_grace_ms),
            reachability: config.reachability_address.clone().map(|address| Reachability {
                address,
                timeout: Duration::from_millis(config.reachability_timeout_ms),
            }),
        }
    }

    /// Measure `interface` with `params.rounds` rounds.
    pub async fn measure(&self, interface: &str, params: &ProbeParams) -> Measurement {
        let rounds = params.rounds.max(1);

        if let Err(e) = self.check_reachability().await {
            tracing::warn!(interface = %interface, error = %e, "Reachability check failed, counting all rounds as lost");
            for _ in 0..rounds {
                metrics::record_probe_round_failure();
            }
            return Measurement {
                packet_loss_percent: FAILED_ROUND_LOSS_PERCENT,
                rtt_ms: 0.0,
                failed_rounds: rounds,
            };
        }

        let deadline = round_deadline(params, self.round_grace);
        let mut loss_sum = 0.0;
        let mut rtt_sum = 0.0;
        let mut failed_rounds = 0;

        for round in 0..rounds {
            let result = match time::timeout(deadline, self.prober.round(interface, params)).await {
                Ok(result) => result,
                Err(_) => Err(ProbeError::Timeout(deadline)),
            };

            match result {
                Ok(sample) => {
                    tracing::trace!(
                        interface = %interface,
                        round,
                        loss = sample.packet_loss_percent,
                        rtt_ms = sample.rtt_ms,
                        "Probe round complete"
                    );
                    loss_sum += sample.packet_loss_percent;
                    rtt_sum += sample.rtt_ms;
                }
                Err(e) => {
                    tracing::warn!(interface = %interface, round, error = %e, "Probe round failed");
                    metrics::record_probe_round_failure();
                    failed_rounds += 1;
                    loss_sum += FAILED_ROUND_LOSS_PERCENT;
                }
            }
        }

        let n = f64::from(rounds);
        Measurement {
            packet_loss_percent: loss_sum / n,
            rtt_ms: truncate_hundredths(rtt_sum / n),
            failed_rounds,
        }
    }

    async fn check_reachability(&self) -> Result<(), ProbeError> {
        let Some(check) = &self.reachability else {
            return Ok(());
        };

        let unreachable = |reason: String| ProbeError::Unreachable {
            address: check.address.clone(),
            reason,
        };

        match time::timeout(check.timeout, TcpStream::connect(check.address.as_str())).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(unreachable(e.to_string())),
            Err(_) => Err(unreachable(format!("no connection within {:?}", check.timeout))),
        }
    }
}
