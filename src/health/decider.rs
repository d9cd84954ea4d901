//! Hysteresis decider.
//!
//! # States
//! Two independent latches, one per metric. A tripped latch votes "reserve".
//!
//! # Latch Transitions
//! ```text
//! rtt:  untripped → tripped   when rtt >  threshold
//!       tripped   → untripped when rtt <  threshold
//! loss: untripped → tripped   when loss >  threshold
//!       tripped   → untripped when loss <= threshold
//! ```
//!
//! # Design Decisions
//! - Transitions are only emitted when a latch flips, never while it stays put
//! - A trip anywhere in the evaluation wins over a clear (fail-safe)
//! - Nothing is emitted when the target path is already active

use crate::config::Thresholds;
use crate::health::probe::Measurement;
use crate::switcher::Path;

/// Latched per-metric verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HysteresisState {
    pub rtt_tripped: bool,
    pub loss_tripped: bool,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    PromoteReserve,
    PromoteMain,
}

impl Transition {
    /// Path to promote, if any.
    pub fn target(&self) -> Option<Path> {
        match self {
            Transition::Stay => None,
            Transition::PromoteReserve => Some(Path::Reserve),
            Transition::PromoteMain => Some(Path::Main),
        }
    }
}

/// Feed one measurement through the latches.
///
/// `active` is the path currently carrying traffic, `None` when unknown.
pub fn decide(
    measurement: &Measurement,
    thresholds: &Thresholds,
    state: HysteresisState,
    active: Option<Path>,
) -> (HysteresisState, Transition) {
    let mut next = state;
    let mut tripped = false;
    let mut cleared = false;

    if !state.rtt_tripped && measurement.rtt_ms > thresholds.rtt_ms {
        next.rtt_tripped = true;
        tripped = true;
    } else if state.rtt_tripped && measurement.rtt_ms < thresholds.rtt_ms {
        next.rtt_tripped = false;
        cleared = true;
    }

    if !state.loss_tripped && measurement.packet_loss_percent > thresholds.packet_loss_percent {
        next.loss_tripped = true;
        tripped = true;
    } else if state.loss_tripped && measurement.packet_loss_percent <= thresholds.packet_loss_percent {
        next.loss_tripped = false;
        cleared = true;
    }

    let target = if tripped {
        Some(Path::Reserve)
    } else if cleared {
        Some(Path::Main)
    } else {
        None
    };

    let transition = match target {
        Some(Path::Reserve) if active != Some(Path::Reserve) => Transition::PromoteReserve,
        Some(Path::Main) if active != Some(Path::Main) => Transition::PromoteMain,
        _ => Transition::Stay,
    };

    if next != state {
        tracing::debug!(
            rtt_ms = measurement.rtt_ms,
            loss = measurement.packet_loss_percent,
            rtt_tripped = next.rtt_tripped,
            loss_tripped = next.loss_tripped,
            transition = ?transition,
            "Latch flipped"
        );
    }

    (next, transition)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: Thresholds = Thresholds {
        rtt_ms: 100.0,
        packet_loss_percent: 5.0,
    };

    fn m(rtt_ms: f64, loss: f64) -> Measurement {
        Measurement {
            packet_loss_percent: loss,
            rtt_ms,
            failed_rounds: 0,
        }
    }

    fn tripped(rtt: bool, loss: bool) -> HysteresisState {
        HysteresisState {
            rtt_tripped: rtt,
            loss_tripped: loss,
        }
    }

    /// Run a sequence, applying every emitted transition to the active path.
    fn run(samples: &[(f64, f64)]) -> Vec<Transition> {
        let mut state = HysteresisState::default();
        let mut active = Some(Path::Main);
        samples
            .iter()
            .map(|&(rtt, loss)| {
                let (next, transition) = decide(&m(rtt, loss), &THRESHOLDS, state, active);
                state = next;
                if let Some(path) = transition.target() {
                    active = Some(path);
                }
                transition
            })
            .collect()
    }

    #[test]
    fn test_healthy_emits_nothing() {
        for (rtt, loss) in [(0.0, 0.0), (50.0, 1.0), (99.9, 4.9), (100.0, 5.0)] {
            let (next, transition) = decide(&m(rtt, loss), &THRESHOLDS, HysteresisState::default(), Some(Path::Main));
            assert_eq!(next, HysteresisState::default());
            assert_eq!(transition, Transition::Stay);
        }
    }

    #[test]
    fn test_scenario_sequence() {
        let transitions = run(&[(80.0, 1.0), (150.0, 2.0), (150.0, 2.0), (60.0, 1.0)]);
        assert_eq!(
            transitions,
            vec![
                Transition::Stay,
                Transition::PromoteReserve,
                Transition::Stay,
                Transition::PromoteMain
            ]
        );
    }

    #[test]
    fn test_flap_suppression_while_degraded() {
        let transitions = run(&[(150.0, 0.0), (300.0, 0.0), (120.0, 0.0), (101.0, 0.0), (100.0, 0.0)]);
        assert_eq!(transitions[0], Transition::PromoteReserve);
        assert!(transitions[1..].iter().all(|t| *t == Transition::Stay));
    }

    #[test]
    fn test_loss_equal_to_threshold_clears() {
        let (next, transition) = decide(&m(10.0, 5.0), &THRESHOLDS, tripped(false, true), Some(Path::Reserve));
        assert!(!next.loss_tripped);
        assert_eq!(transition, Transition::PromoteMain);
    }

    #[test]
    fn test_loss_equal_to_threshold_never_trips() {
        let (next, transition) = decide(&m(10.0, 5.0), &THRESHOLDS, HysteresisState::default(), Some(Path::Main));
        assert!(!next.loss_tripped);
        assert_eq!(transition, Transition::Stay);
    }

    #[test]
    fn test_rtt_equal_to_threshold_leaves_latch() {
        let (next, transition) = decide(&m(100.0, 0.0), &THRESHOLDS, HysteresisState::default(), Some(Path::Main));
        assert_eq!(next, HysteresisState::default());
        assert_eq!(transition, Transition::Stay);

        let (next, transition) = decide(&m(100.0, 0.0), &THRESHOLDS, tripped(true, false), Some(Path::Reserve));
        assert_eq!(next, tripped(true, false));
        assert_eq!(transition, Transition::Stay);
    }

    #[test]
    fn test_trip_wins_over_clear() {
        // rtt clears while loss trips in the same evaluation.
        let (next, transition) = decide(&m(50.0, 20.0), &THRESHOLDS, tripped(true, false), Some(Path::Main));
        assert_eq!(next, tripped(false, true));
        assert_eq!(transition, Transition::PromoteReserve);

        let (_, transition) = decide(&m(50.0, 20.0), &THRESHOLDS, tripped(true, false), Some(Path::Reserve));
        assert_eq!(transition, Transition::Stay);
    }

    #[test]
    fn test_second_trip_while_on_reserve_is_silent() {
        let (next, transition) = decide(&m(150.0, 20.0), &THRESHOLDS, tripped(true, false), Some(Path::Reserve));
        assert_eq!(next, tripped(true, true));
        assert_eq!(transition, Transition::Stay);
    }

    #[test]
    fn test_either_clear_restores_main() {
        // Both tripped; rtt recovers while loss stays high.
        let (next, transition) = decide(&m(50.0, 20.0), &THRESHOLDS, tripped(true, true), Some(Path::Reserve));
        assert_eq!(next, tripped(false, true));
        assert_eq!(transition, Transition::PromoteMain);
    }

    #[test]
    fn test_unknown_active_path() {
        let (_, transition) = decide(&m(150.0, 0.0), &THRESHOLDS, HysteresisState::default(), None);
        assert_eq!(transition, Transition::PromoteReserve);
    }
}
