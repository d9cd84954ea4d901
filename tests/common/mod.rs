//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use netswitch::config::settings::ValidTuning;
use netswitch::config::{ConfigStore, Mode, ProbeConfig, ProbeParams};
use netswitch::health::{ProbeError, RoundProber, RoundSample};
use netswitch::switcher::{Path, PathSwitcher, SwitchError};

/// Build a store with thresholds rtt 100 ms and loss 5%, one round of one echo.
pub fn store(mode: Mode) -> Arc<ConfigStore> {
    Arc::new(ConfigStore::new(
        ValidTuning {
            rtt_threshold_ms: 100.0,
            packet_loss_threshold_percent: 5.0,
            probe_count: 1,
            probe_interval_ms: 20,
            probe_rounds: 1,
        }
        .into_settings(mode, "eth0"),
    ))
}

/// A probe config whose round deadline never fires while a test is scripting rounds.
pub fn probe_config() -> ProbeConfig {
    ProbeConfig {
        round_timeout_grace_ms: 60_000,
        cycle_pause_ms: 0,
        ..ProbeConfig::default()
    }
}

pub fn healthy(rtt_ms: f64) -> Result<RoundSample, ProbeError> {
    Ok(RoundSample {
        packet_loss_percent: 0.0,
        rtt_ms,
    })
}

/// Prober whose rounds are fed one by one from the test.
///
/// A round waits until the test pushes its result.
pub struct ScriptedProber {
    rounds: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<RoundSample, ProbeError>>>,
    pub requests: AtomicUsize,
}

impl ScriptedProber {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<Result<RoundSample, ProbeError>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let prober = Arc::new(Self {
            rounds: tokio::sync::Mutex::new(rx),
            requests: AtomicUsize::new(0),
        });
        (prober, tx)
    }
}

#[async_trait]
impl RoundProber for ScriptedProber {
    async fn round(&self, _interface: &str, _params: &ProbeParams) -> Result<RoundSample, ProbeError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.rounds.lock().await.recv().await {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

/// Switcher that records every promotion.
#[derive(Default)]
pub struct RecordingSwitcher {
    calls: Mutex<Vec<Path>>,
    active: Mutex<Option<Path>>,
}

impl RecordingSwitcher {
    pub fn calls(&self) -> Vec<Path> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PathSwitcher for RecordingSwitcher {
    async fn promote(&self, path: Path) -> Result<(), SwitchError> {
        self.calls.lock().unwrap().push(path);
        *self.active.lock().unwrap() = Some(path);
        Ok(())
    }

    fn active(&self) -> Option<Path> {
        *self.active.lock().unwrap()
    }
}

/// Poll `check` until it holds, panicking after two seconds.
pub async fn wait_until<F>(what: &str, check: F)
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !check() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Run `fut` with a two second limit.
pub async fn within<T>(fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), fut)
        .await
        .expect("future did not complete in time")
}
