//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Probe round / path switch:
//!     → timeouts.rs (enforce deadline, kill child on expiry)
//!     → On failure: caller degrades (probe) or logs (switch)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries inside a cycle; the next cycle re-evaluates

pub mod timeouts;
