//! Route-metric switcher.
//!
//! Traffic follows the default route with the lowest metric. The reserve
//! interface keeps a fixed metric between the two values configured here, so
//! moving the primary interface's metric below or above it selects the path.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::{InterfacesConfig, SwitchConfig};
use crate::resilience::timeouts::output_with_timeout;
use crate::switcher::{Path, PathSwitcher, SwitchError};

const SYSFS_NET: &str = "/sys/class/net";

pub struct IfmetricSwitcher {
    command: String,
    timeout: Duration,
    verify_interface: bool,
    interfaces: InterfacesConfig,
    active: Mutex<Option<Path>>,
}

impl IfmetricSwitcher {
    pub fn new(config: &SwitchConfig, interfaces: InterfacesConfig) -> Self {
        Self {
            command: config.command.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            verify_interface: config.verify_interface,
            interfaces,
            active: Mutex::new(None),
        }
    }

    fn metric_for(&self, path: Path) -> u32 {
        match path {
            Path::Main => self.interfaces.preferred_metric,
            Path::Reserve => self.interfaces.demoted_metric,
        }
    }

    fn set_active(&self, path: Path) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(path);
    }
}

#[async_trait]
impl PathSwitcher for IfmetricSwitcher {
    async fn promote(&self, path: Path) -> Result<(), SwitchError> {
        if self.active() == Some(path) {
            tracing::debug!(path = %path, "Path already active");
            return Ok(());
        }

        let interface = &self.interfaces.main;
        if self.verify_interface && !PathBuf::from(SYSFS_NET).join(interface).exists() {
            return Err(SwitchError::InterfaceMissing(interface.clone()));
        }

        let metric = self.metric_for(path);
        let mut command = Command::new(&self.command);
        command.arg(interface).arg(metric.to_string());

        let output = output_with_timeout(&mut command, self.timeout).await?;
        if !output.status.success() {
            return Err(SwitchError::Failed {
                path,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        self.set_active(path);
        tracing::info!(path = %path, interface = %interface, metric, "Route metric updated");
        Ok(())
    }

    fn active(&self) -> Option<Path> {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
