//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! environment (RTT_SETTINGS, PINGER_COUNT, ...)
//!     → env.rs (all required, parsed)
//!     → validation.rs (range checks)
//!     → Settings (runtime tunables)
//!     → store.rs, shared via Arc with the API and the controller
//!
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SwitcherConfig (interfaces, probe, switch, listener)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → [tuning] re-applied through store.rs
//! ```
//!
//! # Design Decisions
//! - Daemon config is immutable once loaded; only `[tuning]` is hot-reloaded
//! - All file fields have defaults to allow minimal configs
//! - Every write into Settings passes the same validation

pub mod env;
pub mod loader;
pub mod schema;
pub mod settings;
pub mod store;
pub mod validation;
pub mod watcher;

pub use schema::SwitcherConfig;
pub use schema::{
    ApiConfig, InterfacesConfig, LogFormat, ObservabilityConfig, ProbeConfig, ProbeTarget, SwitchConfig,
};
pub use settings::{Mode, ProbeParams, Settings, Thresholds, TuningUpdate};
pub use store::{ConfigStore, ModeState};
