#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that enforces the stop-sign dwell requirement.
//!
//! Entering the tolerance zone starts a timing session. Staying in the zone
//! for the full dwell clears the sign for the rest of the run. Leaving the
//! zone while still being timed resets the session and loses the run; there
//! is no partial credit. Dwell time is measured against the tick's clock
//! reading, never against a tick count.

use crossroads_core::{
    latest_tick, ActorSnapshot, Command, Event, JunctionGeometry, LossReason, StopSignPhase,
    StopSignSnapshot,
};

/// Stop-sign compliance tracker evaluated once per tick.
#[derive(Debug, Default)]
pub struct StopSign;

impl StopSign {
    /// Creates a new stop-sign system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits session transitions, and a loss when the player rolls the sign.
    pub fn handle(
        &self,
        events: &[Event],
        geometry: &JunctionGeometry,
        player: &ActorSnapshot,
        session: &StopSignSnapshot,
        out: &mut Vec<Command>,
    ) {
        let Some(now) = latest_tick(events) else {
            return;
        };

        let in_zone = geometry.in_stop_zone(player.position.x());
        match (session.phase, in_zone) {
            (StopSignPhase::Cleared, _) | (StopSignPhase::Inactive, false) => {}
            (StopSignPhase::Inactive, true) => out.push(Command::UpdateStopSign {
                phase: StopSignPhase::Timing { since: now },
            }),
            (StopSignPhase::Timing { since }, true) => {
                if now.saturating_duration_since(since) >= geometry.stop_sign_dwell {
                    out.push(Command::UpdateStopSign {
                        phase: StopSignPhase::Cleared,
                    });
                }
            }
            (StopSignPhase::Timing { .. }, false) => {
                out.push(Command::UpdateStopSign {
                    phase: StopSignPhase::Inactive,
                });
                out.push(Command::DeclareLoss {
                    reason: LossReason::RolledStopSign,
                });
            }
        }
    }
}
