//! `ping`-based round prober.
//!
//! Runs `ping -n -q -I <interface> -c <count> -i <interval> <host>` and reads
//! the statistics summary. Both the iputils and the busybox summary formats
//! are understood.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::{ProbeConfig, ProbeParams};
use crate::health::probe::{round_deadline, ProbeError, RoundProber, RoundSample};
use crate::resilience::timeouts::output_with_timeout;

pub struct PingProber {
    command: String,
    target_host: String,
    grace: Duration,
}

impl PingProber {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            command: config.command.clone(),
            target_host: config.target_host.clone(),
            grace: Duration::from_millis(config.round_timeout_grace_ms),
        }
    }
}

/// `-i` takes seconds.
fn interval_arg(interval_ms: u64) -> String {
    format!("{:.3}", interval_ms as f64 / 1000.0)
}

#[async_trait]
impl RoundProber for PingProber {
    async fn round(&self, interface: &str, params: &ProbeParams) -> Result<RoundSample, ProbeError> {
        let mut command = Command::new(&self.command);
        command
            .arg("-n")
            .arg("-q")
            .arg("-I")
            .arg(interface)
            .arg("-c")
            .arg(params.count.to_string())
            .arg("-i")
            .arg(interval_arg(params.interval_ms))
            .arg(&self.target_host);

        let output = output_with_timeout(&mut command, round_deadline(params, self.grace)).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        // ping exits 1 when nothing came back but still prints a usable summary.
        match parse_summary(&stdout) {
            Ok(sample) => Ok(sample),
            Err(e) if output.status.success() => Err(e),
            Err(_) => Err(ProbeError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

/// Extract loss and average RTT from ping's statistics summary.
pub fn parse_summary(output: &str) -> Result<RoundSample, ProbeError> {
    let loss = output
        .lines()
        .flat_map(|line| line.split(','))
        .find_map(|field| field.trim().strip_suffix("% packet loss"))
        .ok_or_else(|| ProbeError::Parse("no packet loss summary".to_string()))?;
    let packet_loss_percent: f64 = loss
        .trim()
        .parse()
        .map_err(|_| ProbeError::Parse(format!("bad packet loss value {:?}", loss)))?;

    let rtt_line = output.lines().map(str::trim).find(|line| {
        (line.starts_with("rtt ") || line.starts_with("round-trip ")) && line.contains('=')
    });

    let rtt_ms = match rtt_line {
        Some(line) => parse_avg_rtt(line)?,
        // No replies at all: iputils omits the rtt line.
        None if packet_loss_percent >= 100.0 => 0.0,
        None => return Err(ProbeError::Parse("no rtt summary".to_string())),
    };

    Ok(RoundSample {
        packet_loss_percent,
        rtt_ms,
    })
}

/// `rtt min/avg/max/mdev = 11.026/11.812/12.901/0.647 ms` → 11.812
fn parse_avg_rtt(line: &str) -> Result<f64, ProbeError> {
    line.split_once('=')
        .and_then(|(_, values)| values.trim().split('/').nth(1))
        .and_then(|avg| avg.trim().parse().ok())
        .ok_or_else(|| ProbeError::Parse(format!("bad rtt summary {:?}", line)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPUTILS: &str = "PING 8.8.8.8 (8.8.8.8) from 192.168.1.5 eth0: 56(84) bytes of data.

--- 8.8.8.8 ping statistics ---
5 packets transmitted, 5 received, 0% packet loss, time 804ms
rtt min/avg/max/mdev = 11.026/11.812/12.901/0.647 ms
";

    const IPUTILS_PARTIAL: &str = "--- 8.8.8.8 ping statistics ---
3 packets transmitted, 2 received, 33.3333% packet loss, time 402ms
rtt min/avg/max/mdev = 20.100/25.500/30.900/5.400 ms
";

    const IPUTILS_TOTAL_LOSS: &str = "--- 8.8.8.8 ping statistics ---
5 packets transmitted, 0 received, +5 errors, 100% packet loss, time 4005ms
";

    const BUSYBOX: &str = "PING 8.8.8.8 (8.8.8.8): 56 data bytes

--- 8.8.8.8 ping statistics ---
3 packets transmitted, 3 packets received, 0% packet loss
round-trip min/avg/max = 10.123/11.456/12.789 ms
";

    #[test]
    fn test_parse_iputils() {
        let sample = parse_summary(IPUTILS).unwrap();
        assert_eq!(sample.packet_loss_percent, 0.0);
        assert_eq!(sample.rtt_ms, 11.812);
    }

    #[test]
    fn test_parse_partial_loss() {
        let sample = parse_summary(IPUTILS_PARTIAL).unwrap();
        assert_eq!(sample.packet_loss_percent, 33.3333);
        assert_eq!(sample.rtt_ms, 25.5);
    }

    #[test]
    fn test_parse_total_loss_without_rtt() {
        let sample = parse_summary(IPUTILS_TOTAL_LOSS).unwrap();
        assert_eq!(sample.packet_loss_percent, 100.0);
        assert_eq!(sample.rtt_ms, 0.0);
    }

    #[test]
    fn test_parse_busybox() {
        let sample = parse_summary(BUSYBOX).unwrap();
        assert_eq!(sample.packet_loss_percent, 0.0);
        assert_eq!(sample.rtt_ms, 11.456);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_summary("ping: SO_BINDTODEVICE eth9: No such device"),
            Err(ProbeError::Parse(_))
        ));
        assert!(matches!(
            parse_summary("3 packets transmitted, 3 received, 0% packet loss"),
            Err(ProbeError::Parse(_))
        ));
    }

    #[test]
    fn test_interval_arg() {
        assert_eq!(interval_arg(200), "0.200");
        assert_eq!(interval_arg(1500), "1.500");
    }

    #[tokio::test]
    async fn test_failed_command_reports_status() {
        let prober = PingProber::new(&ProbeConfig {
            command: "false".to_string(),
            ..ProbeConfig::default()
        });
        let params = ProbeParams {
            count: 1,
            interval_ms: 20,
            rounds: 1,
        };
        let err = prober.round("eth0", &params).await.unwrap_err();
        assert!(matches!(err, ProbeError::Failed { .. }));
    }
}
