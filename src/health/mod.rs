//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Measurement (probe.rs):
//!     ProbeParams from the store
//!     → N sequential rounds via a RoundProber (ping.rs by default)
//!     → mean loss, mean rtt (truncated to hundredths)
//!
//! Decision (decider.rs):
//!     Measurement + Thresholds + latches
//!     → new latches + Stay | PromoteReserve | PromoteMain
//! ```
//!
//! # Design Decisions
//! - Round failures degrade the measurement, they never abort it
//! - The decider is a pure function; the controller owns its state
//! - Latches instead of counters prevent flapping on noise

pub mod decider;
pub mod ping;
pub mod probe;

pub use decider::{decide, HysteresisState, Transition};
pub use ping::PingProber;
pub use probe::{HealthProbe, Measurement, ProbeError, RoundProber, RoundSample};
