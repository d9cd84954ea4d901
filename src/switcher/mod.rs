//! Path switching subsystem.
//!
//! # Responsibilities
//! - Make a path carry traffic (idempotent)
//! - Report which path was last promoted
//!
//! # Design Decisions
//! - No decision logic here; the controller decides, the switcher executes
//! - Failures are returned, never retried internally

pub mod ifmetric;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::InterfacesConfig;
use crate::resilience::timeouts::CommandError;

pub use ifmetric::IfmetricSwitcher;

/// One of the two network attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Path {
    Main,
    Reserve,
}

impl Path {
    pub fn as_str(&self) -> &'static str {
        match self {
            Path::Main => "main",
            Path::Reserve => "reserve",
        }
    }

    /// Interface name backing this path.
    pub fn interface<'a>(&self, interfaces: &'a InterfacesConfig) -> &'a str {
        match self {
            Path::Main => &interfaces.main,
            Path::Reserve => &interfaces.reserve,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The routing change could not be applied.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("switch to {path} exited with {status}: {stderr}")]
    Failed {
        path: Path,
        status: String,
        stderr: String,
    },

    #[error("interface {0} not present")]
    InterfaceMissing(String),
}

/// The mechanism that redirects traffic.
#[async_trait]
pub trait PathSwitcher: Send + Sync {
    /// Make `path` carry traffic. Promoting the active path is a successful no-op.
    async fn promote(&self, path: Path) -> Result<(), SwitchError>;

    /// Last successfully promoted path, `None` before the first promotion.
    fn active(&self) -> Option<Path>;
}
